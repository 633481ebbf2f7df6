use std::collections::BTreeMap;

use ephid_core::{IdentifierSpace, SpaceError};
use pretty_assertions::assert_eq;

#[test]
fn serialized_space_keeps_starter_length_and_order() {
    let mut map = BTreeMap::new();
    map.insert("Kq".to_string(), vec!["3c".to_string()]);
    map.insert("Bv".to_string(), vec!["0a".to_string(), "9z".to_string()]);
    let space = IdentifierSpace::new(2, map).unwrap();

    let json = serde_json::to_string(&space).unwrap();
    assert_eq!(
        json,
        r#"{"starter_length":2,"starters":{"Bv":["0a","9z"],"Kq":["3c"]}}"#
    );

    let restored: IdentifierSpace = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, space);
    assert_eq!(restored.starters().collect::<Vec<_>>(), vec!["Bv", "Kq"]);
}

#[test]
fn deserialization_revalidates() {
    let err = serde_json::from_str::<IdentifierSpace>(
        r#"{"starter_length":3,"starters":{"Bv":["0a"]}}"#,
    )
    .unwrap_err();
    let expected = SpaceError::StarterLength {
        starter: "Bv".to_string(),
        expected: 3,
        actual: 2,
    };
    assert!(err.to_string().contains(&expected.to_string()));

    assert!(serde_json::from_str::<IdentifierSpace>(
        r#"{"starter_length":2,"starters":{"Bv":["zz"]}}"#
    )
    .is_err());
}
