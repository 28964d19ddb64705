use crate::attributes::TypeAttributes;
use enum_map::Enum;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A reference to a node of a type graph.
///
/// References are only meaningful within the graph (or builder) that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(usize);

impl TypeRef {
    pub(crate) fn new(index: usize) -> Self {
        TypeRef(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of type kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Any,
    Null,
    Bool,
    Integer,
    Double,
    String,
    Array,
    Map,
    Enum,
    Union,
    Class,
}

impl TypeKind {
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            TypeKind::Any
                | TypeKind::Null
                | TypeKind::Bool
                | TypeKind::Integer
                | TypeKind::Double
                | TypeKind::String
        )
    }

    pub fn is_number(self) -> bool {
        matches!(self, TypeKind::Integer | TypeKind::Double)
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeKind::Any => "any",
            TypeKind::Null => "null",
            TypeKind::Bool => "bool",
            TypeKind::Integer => "integer",
            TypeKind::Double => "double",
            TypeKind::String => "string",
            TypeKind::Array => "array",
            TypeKind::Map => "map",
            TypeKind::Enum => "enum",
            TypeKind::Union => "union",
            TypeKind::Class => "class",
        };
        f.write_str(s)
    }
}

/// A property of a class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProperty {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default, rename = "optional")]
    pub is_optional: bool,
}

impl ClassProperty {
    pub fn new(type_ref: TypeRef, is_optional: bool) -> Self {
        ClassProperty {
            type_ref,
            is_optional,
        }
    }
}

/// A record type with named properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassType {
    #[serde(default)]
    pub properties: IndexMap<String, ClassProperty>,
    /// Fixed classes are pinned and must not be restructured.
    #[serde(default, rename = "fixed")]
    pub is_fixed: bool,
}

impl ClassType {
    pub fn new(properties: IndexMap<String, ClassProperty>, is_fixed: bool) -> Self {
        ClassType {
            properties,
            is_fixed,
        }
    }

    pub fn property(&self, name: &str) -> Option<&ClassProperty> {
        self.properties.get(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A type, referring to its constituents through graph references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    Any,
    Null,
    Bool,
    Integer,
    Double,
    String,
    Array { items: TypeRef },
    Map { values: TypeRef },
    Enum { cases: IndexSet<String> },
    Union { members: IndexSet<TypeRef> },
    Class(ClassType),
}

impl Type {
    /// Returns the primitive type of the given kind, if the kind is primitive.
    pub fn primitive(kind: TypeKind) -> Option<Type> {
        match kind {
            TypeKind::Any => Some(Type::Any),
            TypeKind::Null => Some(Type::Null),
            TypeKind::Bool => Some(Type::Bool),
            TypeKind::Integer => Some(Type::Integer),
            TypeKind::Double => Some(Type::Double),
            TypeKind::String => Some(Type::String),
            _ => None,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Any => TypeKind::Any,
            Type::Null => TypeKind::Null,
            Type::Bool => TypeKind::Bool,
            Type::Integer => TypeKind::Integer,
            Type::Double => TypeKind::Double,
            Type::String => TypeKind::String,
            Type::Array { .. } => TypeKind::Array,
            Type::Map { .. } => TypeKind::Map,
            Type::Enum { .. } => TypeKind::Enum,
            Type::Union { .. } => TypeKind::Union,
            Type::Class(_) => TypeKind::Class,
        }
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the references to the direct constituents of the type.
    pub fn children(&self) -> Vec<TypeRef> {
        match self {
            Type::Array { items } => vec![*items],
            Type::Map { values } => vec![*values],
            Type::Union { members } => members.iter().copied().collect(),
            Type::Class(c) => c.properties.values().map(|p| p.type_ref).collect(),
            _ => Vec::new(),
        }
    }

    /// Rebuilds the type with every constituent reference mapped through `f`.
    pub fn try_map_refs<E, F>(&self, mut f: F) -> Result<Type, E>
    where
        F: FnMut(TypeRef) -> Result<TypeRef, E>,
    {
        let ty = match self {
            Type::Array { items } => Type::Array { items: f(*items)? },
            Type::Map { values } => Type::Map { values: f(*values)? },
            Type::Union { members } => Type::Union {
                members: members
                    .iter()
                    .map(|m| f(*m))
                    .collect::<Result<IndexSet<_>, E>>()?,
            },
            Type::Class(c) => {
                let mut properties = IndexMap::with_capacity(c.properties.len());
                for (name, prop) in c.properties.iter() {
                    let type_ref = f(prop.type_ref)?;
                    properties.insert(name.clone(), ClassProperty::new(type_ref, prop.is_optional));
                }
                Type::Class(ClassType::new(properties, c.is_fixed))
            }
            _ => self.clone(),
        };
        Ok(ty)
    }
}

/// A node of the type graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    #[serde(flatten)]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "TypeAttributes::is_empty")]
    pub attributes: TypeAttributes,
}

impl TypeNode {
    pub fn new(ty: Type, attributes: TypeAttributes) -> Self {
        TypeNode { ty, attributes }
    }

    pub fn kind(&self) -> TypeKind {
        self.ty.kind()
    }
}
