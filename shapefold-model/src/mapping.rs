use crate::attributes::{AttributeKind, TypeAttributes};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A format recognized in string samples.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    Date,
    Time,
    DateTime,
    Uuid,
    Uri,
    IntegerString,
    BoolString,
}

impl StringFormat {
    pub const ALL: [StringFormat; 7] = [
        StringFormat::Date,
        StringFormat::Time,
        StringFormat::DateTime,
        StringFormat::Uuid,
        StringFormat::Uri,
        StringFormat::IntegerString,
        StringFormat::BoolString,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StringFormat::Date => "date",
            StringFormat::Time => "time",
            StringFormat::DateTime => "date-time",
            StringFormat::Uuid => "uuid",
            StringFormat::Uri => "uri",
            StringFormat::IntegerString => "integer-string",
            StringFormat::BoolString => "bool-string",
        }
    }

    pub fn parse(s: &str) -> Option<StringFormat> {
        StringFormat::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

/// The string formats a target keeps distinct from plain strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringTypeMapping(IndexSet<StringFormat>);

impl Default for StringTypeMapping {
    fn default() -> Self {
        StringTypeMapping(StringFormat::ALL.into_iter().collect())
    }
}

impl StringTypeMapping {
    /// A mapping which degrades every format to a plain string.
    pub fn plain() -> Self {
        StringTypeMapping(IndexSet::new())
    }

    pub fn with(mut self, format: StringFormat) -> Self {
        self.0.insert(format);
        self
    }

    pub fn keeps(&self, format: StringFormat) -> bool {
        self.0.contains(&format)
    }

    /// Strips the format attribute of a string type if the target does not keep it.
    pub fn apply(&self, attributes: &mut TypeAttributes) {
        let kept = match attributes.get(&AttributeKind::FORMAT) {
            None => return,
            Some(Value::String(s)) => StringFormat::parse(s).is_some_and(|f| self.keeps(f)),
            Some(_) => false,
        };
        if !kept {
            attributes.remove(&AttributeKind::FORMAT);
        }
    }
}
