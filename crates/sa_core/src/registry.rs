//! The global descriptor registry.
//!
//! Descriptors are static declarations, so the registry is built once
//! and shared. A descriptor whose bundle fails to parse is a packaging
//! bug and aborts startup.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::info;

use crate::descriptor::AnalysisDescriptor;

static REGISTRY: Lazy<BTreeMap<&'static str, AnalysisDescriptor>> = Lazy::new(|| {
    let descriptors = crate::descriptors::all()
        .unwrap_or_else(|fault| panic!("descriptor catalog failed to load: {fault}"));
    let mut map = BTreeMap::new();
    for descriptor in descriptors {
        let id = descriptor.id;
        if map.insert(id, descriptor).is_some() {
            panic!("duplicate descriptor id '{id}'");
        }
    }
    info!(procedures = map.len(), "descriptor registry loaded");
    map
});

/// The full registry, keyed by procedure id.
pub fn global() -> &'static BTreeMap<&'static str, AnalysisDescriptor> {
    &REGISTRY
}

/// Looks up one registered procedure.
pub fn descriptor(id: &str) -> Option<&'static AnalysisDescriptor> {
    REGISTRY.get(id)
}

/// Registered procedure ids, sorted.
pub fn ids() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_loads_and_ids_are_sorted() {
        let ids = ids();
        assert!(ids.len() >= 15);
        assert!(ids.contains(&"descriptive"));
        assert!(ids.contains(&"one-sample-t"));
        assert!(ids.contains(&"topsis"));
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn lookup_by_id() {
        assert!(descriptor("correlation").is_some());
        assert!(descriptor("no-such-procedure").is_none());
    }

    #[test]
    fn every_descriptor_carries_both_locales() {
        for d in global().values() {
            assert_eq!(d.bundle.locales(), vec!["en-US", "zh-CN"], "{}", d.id);
        }
    }

    #[test]
    fn every_referenced_key_resolves_in_every_locale() {
        for d in global().values() {
            for locale in d.bundle.locales() {
                for key in d.referenced_keys() {
                    assert!(
                        d.bundle.has(locale, &key),
                        "procedure '{}' is missing '{key}' in {locale}",
                        d.id
                    );
                }
            }
        }
    }
}
