//! Property-based tests for naming and persistence invariants.

use ezdb_core::{Config, Database, KeyId};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use tempfile::tempdir;

fn key_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9 _-]{0,11}").expect("Invalid regex")
}

fn property_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_.-]{0,11}").expect("Invalid regex")
}

fn property_value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,24}").expect("Invalid regex")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn names_stay_unique(names in prop::collection::vec(key_name_strategy(), 1..40)) {
        let mut db = Database::new("unused");
        let mut seen = HashSet::new();

        for name in &names {
            let added = db.add_key(name.as_str()).is_some();
            prop_assert_eq!(added, seen.insert(name.clone()));
        }

        prop_assert_eq!(db.len(), seen.len());
        let stored: HashSet<&str> = db.iter().map(|k| k.name()).collect();
        prop_assert_eq!(stored.len(), db.len());
    }

    #[test]
    fn saved_ids_are_distinct(count in 1usize..60) {
        let temp = tempdir().unwrap();
        let mut db = Database::with_config(temp.path(), Config::default().id_length(2));
        for n in 0..count {
            db.add_key(format!("key{n}")).unwrap();
        }
        db.save().unwrap();

        let ids: HashSet<&KeyId> = db.iter().filter_map(|k| k.id()).collect();
        prop_assert_eq!(ids.len(), count);
        prop_assert_eq!(db.dir().key_files().unwrap().len(), count);
    }

    #[test]
    fn properties_round_trip(
        properties in prop::collection::btree_map(
            property_name_strategy(),
            property_value_strategy(),
            0..8,
        ),
        description in prop::option::of(property_value_strategy()),
    ) {
        let temp = tempdir().unwrap();
        let mut db = Database::new(temp.path());
        let mut key = db.add_key("subject").unwrap();
        key.set_properties(properties.clone()).unwrap();
        key.set_description(description.clone()).unwrap();
        db.save().unwrap();

        let mut reopened = Database::open(temp.path()).unwrap();
        let mut key = reopened.get_key_mut("subject").unwrap();
        key.load().unwrap();

        let loaded: BTreeMap<String, String> = key.properties().cloned().unwrap_or_default();
        prop_assert_eq!(loaded, properties);
        prop_assert_eq!(key.description().map(str::to_string), description);
    }
}
