//! Property-based tests using proptest
//!
//! These tests verify the loader against randomized directory trees and the
//! id/version skip rule against randomized resource headers.

use fhirload::resource::{load_payloads, ResourceDescriptor, ResourcePayload};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// A file to create: subdirectory (empty for the root), name, contents
fn arb_file() -> impl Strategy<Value = (String, String, String)> {
    (
        prop_oneof![
            Just(""),
            Just("codesystems"),
            Just("valuesets"),
            Just("r4/hl7"),
            Just(".hidden0"),
        ],
        prop_oneof!["[a-z][a-z0-9-]{0,12}\\.json", "\\.[a-z]{1,8}"],
        "[ -~]{0,64}",
    )
        .prop_map(|(dir, name, contents)| (dir.to_string(), name, contents))
}

/// Files keyed by relative path so names are unique
fn arb_tree() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::vec(arb_file(), 0..20).prop_map(|files| {
        files
            .into_iter()
            .map(|(dir, name, contents)| {
                let rel = if dir.is_empty() {
                    name
                } else {
                    format!("{}/{}", dir, name)
                };
                (rel, contents)
            })
            .collect()
    })
}

fn is_hidden_file(rel: &str) -> bool {
    rel.rsplit('/').next().map(|n| n.starts_with('.')).unwrap_or(false)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Loaded contents equal the contents of all non-hidden files
    #[test]
    fn loader_returns_every_visible_file(tree in arb_tree()) {
        let temp_dir = TempDir::new().unwrap();
        for (rel, contents) in &tree {
            let path = temp_dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, contents).unwrap();
        }

        let mut loaded: Vec<String> = load_payloads(temp_dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.body)
            .collect();
        let mut expected: Vec<String> = tree
            .iter()
            .filter(|(rel, _)| !is_hidden_file(rel))
            .map(|(_, contents)| contents.clone())
            .collect();

        loaded.sort();
        expected.sort();
        prop_assert_eq!(loaded, expected);
    }

    /// Loading twice gives the same order
    #[test]
    fn loader_order_is_stable(tree in arb_tree()) {
        let temp_dir = TempDir::new().unwrap();
        for (rel, contents) in &tree {
            let path = temp_dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, contents).unwrap();
        }

        let first = load_payloads(temp_dir.path()).unwrap();
        let second = load_payloads(temp_dir.path()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// A descriptor exists exactly when both id and version are non-empty
    #[test]
    fn descriptor_requires_id_and_version(
        resource_type in prop_oneof![Just("CodeSystem"), Just("ValueSet"), Just("ConceptMap")],
        id in proptest::option::of("[A-Za-z0-9.-]{0,16}"),
        version in proptest::option::of("[0-9a-zA-Z.]{0,8}"),
    ) {
        let mut resource = json!({ "resourceType": resource_type, "status": "active" });
        if let Some(id) = &id {
            resource["id"] = json!(id);
        }
        if let Some(version) = &version {
            resource["version"] = json!(version);
        }
        let payload = ResourcePayload::new("r.json", resource.to_string());

        let descriptor = ResourceDescriptor::parse(&payload).unwrap();

        let actionable = id.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
            && version.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        prop_assert_eq!(descriptor.is_some(), actionable);
        if let Some(d) = descriptor {
            prop_assert_eq!(d.resource_type, resource_type);
            prop_assert_eq!(Some(d.id), id);
            prop_assert_eq!(Some(d.version), version);
        }
    }
}
