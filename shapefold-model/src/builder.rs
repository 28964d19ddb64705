use crate::attributes::TypeAttributes;
use crate::errors::{Error, Kind, Result};
use crate::graph::TypeGraph;
use crate::mapping::StringTypeMapping;
use crate::types::{Type, TypeKind, TypeNode, TypeRef};
use enum_map::EnumMap;
use indexmap::IndexMap;

/// A builder of type graphs.
///
/// Nodes may be built in two phases: a forwarding reference is first reserved with
/// [`TypeBuilder::reserve`], handed out to the constituents of the node, and later resolved
/// by passing it to [`TypeBuilder::add`]. This is how cyclic types get built.
#[derive(Debug)]
pub struct TypeBuilder {
    slots: Vec<Option<TypeNode>>,
    top_levels: IndexMap<String, TypeRef>,
    /// Interned primitive types without attributes.
    primitives: EnumMap<TypeKind, Option<TypeRef>>,
    string_type_mapping: StringTypeMapping,
    alphabetize_properties: bool,
}

impl Default for TypeBuilder {
    fn default() -> Self {
        TypeBuilder::new(StringTypeMapping::default(), false)
    }
}

impl TypeBuilder {
    pub fn new(string_type_mapping: StringTypeMapping, alphabetize_properties: bool) -> Self {
        TypeBuilder {
            slots: Vec::new(),
            top_levels: IndexMap::new(),
            primitives: EnumMap::default(),
            string_type_mapping,
            alphabetize_properties,
        }
    }

    /// Reserves a forwarding reference for a node to be added later.
    pub fn reserve(&mut self) -> TypeRef {
        self.slots.push(None);
        TypeRef::new(self.slots.len() - 1)
    }

    /// Returns whether the reference designates an added node, as opposed to a pending one.
    pub fn is_resolved(&self, r: TypeRef) -> bool {
        matches!(self.slots.get(r.index()), Some(Some(_)))
    }

    /// Returns the node designated by the reference, if already added.
    pub fn get(&self, r: TypeRef) -> Option<&TypeNode> {
        self.slots.get(r.index()).and_then(Option::as_ref)
    }

    /// Adds a node, resolving the forwarding reference if one is given.
    pub fn add(
        &mut self,
        mut ty: Type,
        mut attributes: TypeAttributes,
        forwarding: Option<TypeRef>,
    ) -> Result<TypeRef> {
        if let Some(r) = ty.children().into_iter().find(|r| r.index() >= self.slots.len()) {
            return Err(Error::new(Kind::InvalidReference, "unknown constituent").with(&r));
        }

        match &mut ty {
            Type::Class(class) if self.alphabetize_properties => class.properties.sort_keys(),
            Type::String => self.string_type_mapping.apply(&mut attributes),
            _ => {}
        }

        let kind = ty.kind();
        let node = TypeNode::new(ty, attributes);

        match forwarding {
            Some(r) => {
                let slot = self.slots.get_mut(r.index()).ok_or_else(|| {
                    Error::new(Kind::InvalidReference, "unknown forwarding reference").with(&r)
                })?;
                if slot.is_some() {
                    return Err(Error::new(Kind::DuplicateForward, "slot already filled").with(&r));
                }
                *slot = Some(node);
                Ok(r)
            }
            None => {
                let internable = kind.is_primitive() && node.attributes.is_empty();
                if internable {
                    if let Some(r) = self.primitives[kind] {
                        return Ok(r);
                    }
                }
                self.slots.push(Some(node));
                let r = TypeRef::new(self.slots.len() - 1);
                if internable {
                    self.primitives[kind] = Some(r);
                }
                Ok(r)
            }
        }
    }

    /// Adds a primitive type of the given kind.
    pub fn add_primitive(
        &mut self,
        kind: TypeKind,
        attributes: TypeAttributes,
        forwarding: Option<TypeRef>,
    ) -> Result<TypeRef> {
        let ty = Type::primitive(kind).ok_or_else(|| {
            Error::new(Kind::InvalidType, "not a primitive kind").with(&kind)
        })?;
        self.add(ty, attributes, forwarding)
    }

    /// Names a type as a top-level type of the graph.
    pub fn add_top_level<S: Into<String>>(&mut self, name: S, r: TypeRef) -> Result<()> {
        if r.index() >= self.slots.len() {
            return Err(Error::new(Kind::InvalidReference, "unknown top-level type").with(&r));
        }
        self.top_levels.insert(name.into(), r);
        Ok(())
    }

    /// Completes the graph, checking that all forwarding references were resolved.
    pub fn finish(self) -> Result<TypeGraph> {
        let nodes = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    Error::new(Kind::UnresolvedForward, "graph is incomplete")
                        .with(&TypeRef::new(index))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        TypeGraph::validated(nodes, self.top_levels)
    }
}
