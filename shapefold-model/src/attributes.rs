use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// The identifier of a kind of type attribute.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeKind(Cow<'static, str>);

impl AttributeKind {
    /// The names inferred for a type, e.g. from the keys it was found under.
    pub const NAMES: AttributeKind = AttributeKind(Cow::Borrowed("names"));
    /// Free-form descriptions gathered from the input.
    pub const DESCRIPTION: AttributeKind = AttributeKind(Cow::Borrowed("description"));
    /// User overrides of property accessor names.
    pub const ACCESSOR_NAMES: AttributeKind = AttributeKind(Cow::Borrowed("accessor-names"));
    /// The format of a string type.
    pub const FORMAT: AttributeKind = AttributeKind(Cow::Borrowed("format"));

    pub fn new<S: Into<Cow<'static, str>>>(name: S) -> Self {
        AttributeKind(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

/// The bag of attributes attached to a type node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeAttributes(BTreeMap<AttributeKind, Value>);

impl TypeAttributes {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a bag holding the given inferred names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(|n| Value::String(n.into())).collect();
        TypeAttributes::new().with(AttributeKind::NAMES, Value::Array(names))
    }

    pub fn with(mut self, kind: AttributeKind, value: Value) -> Self {
        self.insert(kind, value);
        self
    }

    pub fn insert(&mut self, kind: AttributeKind, value: Value) -> Option<Value> {
        self.0.insert(kind, value)
    }

    pub fn remove(&mut self, kind: &AttributeKind) -> Option<Value> {
        self.0.remove(kind)
    }

    pub fn get(&self, kind: &AttributeKind) -> Option<&Value> {
        self.0.get(kind)
    }

    /// Returns the inferred names, if any.
    pub fn names(&self) -> Vec<&str> {
        match self.get(&AttributeKind::NAMES) {
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(name)) => vec![name.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKind, &Value)> {
        self.0.iter()
    }
}

/// A combination policy for one kind of attribute.
///
/// The slice holds one entry per combined bag, `None` where the bag lacks the attribute.
/// Returning `None` drops the attribute from the combined bag.
pub type CombineFn = fn(&[Option<&Value>]) -> Option<Value>;

/// Concatenates all values, flattening arrays and skipping duplicates.
pub fn combine_union(values: &[Option<&Value>]) -> Option<Value> {
    let mut items: Vec<Value> = Vec::new();
    for value in values.iter().flatten() {
        let elements = match value {
            Value::Array(a) => a.clone(),
            other => vec![(*other).clone()],
        };
        for e in elements {
            if !items.contains(&e) {
                items.push(e);
            }
        }
    }
    (!items.is_empty()).then_some(Value::Array(items))
}

/// Keeps the value only if every bag holds the same value.
pub fn combine_agreement(values: &[Option<&Value>]) -> Option<Value> {
    let (first, rest) = values.split_first()?;
    let first = (*first)?;
    rest.iter()
        .all(|v| *v == Some(first))
        .then(|| first.clone())
}

/// A registry of combination policies indexed by attribute kind.
#[derive(Clone, Debug, Default)]
pub struct AttributeRegistry {
    policies: HashMap<AttributeKind, CombineFn>,
}

impl AttributeRegistry {
    /// Creates a registry without any policy.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a registry with the policies of the standard attribute kinds.
    pub fn standard() -> Self {
        AttributeRegistry::new()
            .with(AttributeKind::NAMES, combine_union)
            .with(AttributeKind::DESCRIPTION, combine_union)
            .with(AttributeKind::ACCESSOR_NAMES, combine_agreement)
            .with(AttributeKind::FORMAT, combine_agreement)
    }

    pub fn with(mut self, kind: AttributeKind, f: CombineFn) -> Self {
        self.register(kind, f);
        self
    }

    /// Registers a policy, returning the policy it replaces if any.
    pub fn register(&mut self, kind: AttributeKind, f: CombineFn) -> Option<CombineFn> {
        self.policies.insert(kind, f)
    }

    pub fn policy(&self, kind: &AttributeKind) -> Option<CombineFn> {
        self.policies.get(kind).copied()
    }

    /// Combines several bags of attributes into one.
    ///
    /// A single bag is returned as is. Otherwise every attribute kind goes through its policy,
    /// and kinds without a policy are dropped.
    pub fn combine<'a, I>(&self, bags: I) -> TypeAttributes
    where
        I: IntoIterator<Item = &'a TypeAttributes>,
    {
        let bags: Vec<&TypeAttributes> = bags.into_iter().collect();
        match bags.as_slice() {
            [] => return TypeAttributes::new(),
            [single] => return (*single).clone(),
            _ => {}
        }

        let mut kinds: Vec<&AttributeKind> = bags.iter().flat_map(|b| b.0.keys()).collect();
        kinds.sort();
        kinds.dedup();

        let mut combined = TypeAttributes::new();
        for kind in kinds {
            let Some(policy) = self.policy(kind) else {
                log::trace!("dropping attribute {} without combination policy", kind.as_str());
                continue;
            };
            let values: Vec<Option<&Value>> = bags.iter().map(|b| b.get(kind)).collect();
            if let Some(value) = policy(&values) {
                combined.insert(kind.clone(), value);
            }
        }
        combined
    }
}
