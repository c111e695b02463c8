//! Counts and name lists derived from mapping sequences.

use std::collections::HashSet;

use crate::model::{ModelMapping, Provider};

/// Number of distinct client-facing names across all providers.
pub fn count_distinct_sources(providers: &[Provider]) -> usize {
    providers
        .iter()
        .flat_map(|p| p.models.iter())
        .map(|m| m.from.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Client-facing names the gateway will advertise: enabled mappings only,
/// first-seen order across providers.
pub fn advertised_models(providers: &[Provider]) -> Vec<String> {
    let mut seen = HashSet::new();
    providers
        .iter()
        .flat_map(|p| p.models.iter())
        .filter(|m| m.enabled && seen.insert(m.from.as_str()))
        .map(|m| m.from.clone())
        .collect()
}

/// Distinct upstream names in first-seen order; the candidates for a model test.
pub fn distinct_targets(models: &[ModelMapping]) -> Vec<String> {
    let mut seen = HashSet::new();
    models
        .iter()
        .filter(|m| seen.insert(m.to.as_str()))
        .map(|m| m.to.clone())
        .collect()
}
