pub mod attributes;
pub mod builder;
pub mod errors;
pub mod graph;
pub mod mapping;
mod recursion;
pub mod rewrite;
mod structural;
pub mod types;

#[cfg(test)]
mod attributes_tests;
#[cfg(test)]
mod rewrite_tests;

pub use crate::attributes::{AttributeKind, AttributeRegistry, TypeAttributes};
pub use crate::builder::TypeBuilder;
pub use crate::graph::{SeparatedNamedTypes, TypeGraph};
pub use crate::mapping::{StringFormat, StringTypeMapping};
pub use crate::rewrite::GraphRewriteBuilder;
pub use crate::types::{ClassProperty, ClassType, Type, TypeKind, TypeNode, TypeRef};
