//! Editing mapping sequences: what survives a save, and rows added from a picker.

use std::collections::HashSet;

use crate::model::ModelMapping;

/// The mappings that survive serialization of a draft: names trimmed,
/// rows with an empty `from` or `to` dropped, order preserved.
pub fn persistable(models: &[ModelMapping]) -> Vec<ModelMapping> {
    models
        .iter()
        .filter(|m| m.is_complete())
        .map(|m| ModelMapping {
            from: m.from.trim().to_string(),
            to: m.to.trim().to_string(),
            enabled: m.enabled,
        })
        .collect()
}

/// Append an enabled `name → name` mapping for every picked upstream model not
/// already targeted by `models`. Returns how many rows were added.
pub fn add_picked<I, S>(models: &mut Vec<ModelMapping>, picked: I) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut targets: HashSet<String> = models
        .iter()
        .filter(|m| m.is_complete())
        .map(|m| m.to.trim().to_string())
        .collect();
    let mut added = 0;
    for name in picked {
        let name = name.as_ref().trim();
        if name.is_empty() || !targets.insert(name.to_string()) {
            continue;
        }
        models.push(ModelMapping::new(name, name));
        added += 1;
    }
    if added > 0 {
        tracing::debug!("model picker: added {} mapping(s)", added);
    }
    added
}
