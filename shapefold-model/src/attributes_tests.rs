use crate::attributes::{combine_agreement, AttributeKind, AttributeRegistry, TypeAttributes};
use serde_json::{json, Value};

#[test]
fn attributes_combine_names() {
    let registry = AttributeRegistry::standard();
    let a = TypeAttributes::from_names(["User", "Owner"]);
    let b = TypeAttributes::from_names(["Owner", "Author"]);
    let c = TypeAttributes::new();

    let combined = registry.combine([&a, &b, &c]);
    assert_eq!(combined.names(), vec!["User", "Owner", "Author"]);
}

#[test]
fn attributes_combine_agreement() {
    let registry = AttributeRegistry::standard();
    let date = TypeAttributes::new().with(AttributeKind::FORMAT, json!("date"));
    let time = TypeAttributes::new().with(AttributeKind::FORMAT, json!("time"));

    let combined = registry.combine([&date, &date.clone()]);
    assert_eq!(combined.get(&AttributeKind::FORMAT), Some(&json!("date")));

    let combined = registry.combine([&date, &time]);
    assert!(combined.is_empty());

    let combined = registry.combine([&date, &TypeAttributes::new()]);
    assert!(combined.is_empty());
}

#[test]
fn attributes_combine_unregistered() {
    let registry = AttributeRegistry::standard();
    let custom = AttributeKind::new("x-origin");
    let a = TypeAttributes::from_names(["A"]).with(custom.clone(), json!("input.json"));
    let b = TypeAttributes::from_names(["B"]);

    // A single bag is kept as is, whatever its kinds.
    assert_eq!(registry.combine([&a]), a);
    assert!(registry.combine(std::iter::empty()).is_empty());

    let combined = registry.combine([&a, &b]);
    assert_eq!(combined.len(), 1);
    assert!(combined.get(&custom).is_none());

    let registry = registry.with(custom.clone(), combine_agreement);
    let combined = registry.combine([&a, &a]);
    assert_eq!(combined.get(&custom), Some(&json!("input.json")));
}

#[test]
fn attributes_custom_policy() {
    fn count(values: &[Option<&Value>]) -> Option<Value> {
        let n = values.iter().filter(|v| v.is_some()).count();
        Some(json!(n))
    }

    let mut registry = AttributeRegistry::new();
    let kind = AttributeKind::new("seen");
    assert!(registry.register(kind.clone(), count).is_none());
    assert!(registry.policy(&kind).is_some());
    assert!(registry.policy(&AttributeKind::NAMES).is_none());

    let a = TypeAttributes::new().with(kind.clone(), json!(true));
    let combined = registry.combine([&a, &TypeAttributes::new(), &a]);
    assert_eq!(combined.get(&kind), Some(&json!(2)));
}
