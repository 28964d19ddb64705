use crate::attributes::TypeAttributes;
use crate::errors::{Error, Kind, Result};
use crate::types::{ClassType, Type, TypeKind, TypeNode, TypeRef};
use enum_map::EnumMap;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Index;

/// The graph of all types of one compilation.
///
/// A graph is immutable: passes produce new graphs through [`TypeGraph::rewrite`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    top_levels: IndexMap<String, TypeRef>,
}

/// The named types of a graph, separated by kind, in reachability order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeparatedNamedTypes {
    pub classes: Vec<TypeRef>,
    pub maps: Vec<TypeRef>,
    pub enums: Vec<TypeRef>,
    pub unions: Vec<TypeRef>,
}

impl TypeGraph {
    /// Creates a graph after checking its structural invariants.
    pub(crate) fn validated(
        nodes: Vec<TypeNode>,
        top_levels: IndexMap<String, TypeRef>,
    ) -> Result<Self> {
        let valid = |r: &TypeRef| r.index() < nodes.len();

        for (name, r) in top_levels.iter() {
            if !valid(r) {
                return Err(Error::new(Kind::InvalidReference, "dangling top-level type")
                    .with(name)
                    .with(r));
            }
        }

        for (index, node) in nodes.iter().enumerate() {
            let children = node.ty.children();
            if let Some(r) = children.iter().find(|r| !valid(r)) {
                return Err(Error::new(Kind::InvalidReference, "dangling type reference")
                    .with(&TypeRef::new(index))
                    .with(r));
            }
            if let Type::Union { members } = &node.ty {
                let mut seen = EnumMap::<TypeKind, bool>::default();
                for m in members.iter() {
                    let kind = nodes[m.index()].kind();
                    if std::mem::replace(&mut seen[kind], true) {
                        return Err(Error::new(Kind::DuplicateUnionKind, "in union")
                            .with(&TypeRef::new(index))
                            .with(&kind));
                    }
                }
            }
        }

        Ok(TypeGraph { nodes, top_levels })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over the references to all nodes, in allocation order.
    pub fn refs(&self) -> impl Iterator<Item = TypeRef> {
        (0..self.nodes.len()).map(TypeRef::new)
    }

    pub fn get(&self, r: TypeRef) -> Option<&TypeNode> {
        self.nodes.get(r.index())
    }

    pub fn ty(&self, r: TypeRef) -> &Type {
        &self[r].ty
    }

    pub fn kind(&self, r: TypeRef) -> TypeKind {
        self[r].kind()
    }

    pub fn attributes(&self, r: TypeRef) -> &TypeAttributes {
        &self[r].attributes
    }

    pub fn class(&self, r: TypeRef) -> Option<&ClassType> {
        self.ty(r).as_class()
    }

    pub fn top_levels(&self) -> &IndexMap<String, TypeRef> {
        &self.top_levels
    }

    pub fn top_level(&self, name: &str) -> Option<TypeRef> {
        self.top_levels.get(name).copied()
    }

    /// Returns the types reachable from the top-level types, in depth-first pre-order.
    pub fn reachable(&self) -> Vec<TypeRef> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<TypeRef> = self.top_levels.values().rev().copied().collect();
        while let Some(r) = stack.pop() {
            if !visited.insert(r) {
                continue;
            }
            order.push(r);
            stack.extend(self.ty(r).children().into_iter().rev());
        }
        order
    }

    /// Enumerates the reachable named types, i.e. the types that get a name in the output.
    pub fn all_named_types_separated(&self) -> SeparatedNamedTypes {
        let mut named = SeparatedNamedTypes::default();
        for r in self.reachable() {
            match self.kind(r) {
                TypeKind::Class => named.classes.push(r),
                TypeKind::Map => named.maps.push(r),
                TypeKind::Enum => named.enums.push(r),
                TypeKind::Union => named.unions.push(r),
                _ => {}
            }
        }
        named
    }

    /// Returns the member types of `r` excluding `Null`.
    ///
    /// A non-union type is its own single case, and `Null` has no case.
    pub fn non_null_type_cases(&self, r: TypeRef) -> IndexSet<TypeRef> {
        match self.ty(r) {
            Type::Null => IndexSet::new(),
            Type::Union { members } => members
                .iter()
                .flat_map(|m| self.non_null_type_cases(*m))
                .collect(),
            _ => IndexSet::from([r]),
        }
    }
}

impl Index<TypeRef> for TypeGraph {
    type Output = TypeNode;

    fn index(&self, r: TypeRef) -> &TypeNode {
        &self.nodes[r.index()]
    }
}

/// The serialized form of a type graph.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct GraphData {
    #[serde(default)]
    top_levels: IndexMap<String, TypeRef>,
    #[serde(default)]
    types: Vec<TypeNode>,
}

impl TryFrom<GraphData> for TypeGraph {
    type Error = Error;

    fn try_from(data: GraphData) -> Result<Self> {
        TypeGraph::validated(data.types, data.top_levels)
    }
}

impl From<TypeGraph> for GraphData {
    fn from(graph: TypeGraph) -> Self {
        GraphData {
            top_levels: graph.top_levels,
            types: graph.nodes,
        }
    }
}
