//! Upstream model picker: which listed models are already mapped.

use std::collections::HashSet;

use crate::model::ModelMapping;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub name: String,
    /// Already the target of a mapping in the draft.
    pub preselected: bool,
}

/// One entry per upstream name, in upstream order, marked against the draft's targets.
pub fn build_picker(upstream: &[String], existing: &[ModelMapping]) -> Vec<PickerEntry> {
    let targets: HashSet<&str> = existing
        .iter()
        .filter(|m| m.is_complete())
        .map(|m| m.to.trim())
        .collect();
    upstream
        .iter()
        .map(|name| PickerEntry {
            name: name.clone(),
            preselected: targets.contains(name.as_str()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_models_already_targeted() {
        let upstream = vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()];
        let existing = vec![
            ModelMapping::new("fast", "gpt-4o-mini"),
            ModelMapping::new("", "gpt-4o"),
        ];
        let entries = build_picker(&upstream, &existing);
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].preselected, "incomplete rows do not count");
        assert!(entries[1].preselected);
    }
}
