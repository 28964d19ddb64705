use crate::attributes::TypeAttributes;
use crate::builder::TypeBuilder;
use crate::errors::{Error, Kind, Result};
use crate::graph::TypeGraph;
use crate::mapping::StringTypeMapping;
use crate::types::{Type, TypeKind, TypeNode, TypeRef};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Builds a new graph from an existing one, replacing groups of types.
///
/// Every group of types to replace is assigned a single forwarding reference in the new graph.
/// Any reference to a member of a group, wherever it occurs, resolves to that reference.
#[derive(Debug)]
pub struct GraphRewriteBuilder<'a> {
    source: &'a TypeGraph,
    builder: TypeBuilder,
    /// The index of the group of every type to replace.
    group_of: HashMap<TypeRef, usize>,
    /// The reference of every group in the new graph, once reserved.
    group_refs: Vec<Option<TypeRef>>,
    /// The already copied types, from old to new references.
    reconstituted: HashMap<TypeRef, TypeRef>,
    /// The already unified sets of old types.
    unions: HashMap<Vec<TypeRef>, TypeRef>,
}

fn union_key(refs: &IndexSet<TypeRef>) -> Vec<TypeRef> {
    let mut key: Vec<TypeRef> = refs.iter().copied().collect();
    key.sort();
    key
}

impl<'a> GraphRewriteBuilder<'a> {
    fn new(
        source: &'a TypeGraph,
        groups: &[Vec<TypeRef>],
        string_type_mapping: StringTypeMapping,
        alphabetize_properties: bool,
    ) -> Result<Self> {
        let mut group_of = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            if group.is_empty() {
                return Err(Error::new(Kind::InvalidGroup, "empty group").with(&index));
            }
            for r in group.iter() {
                if source.get(*r).is_none() {
                    return Err(Error::new(Kind::InvalidReference, "in group").with(r));
                }
                if group_of.insert(*r, index).is_some() {
                    return Err(Error::new(Kind::InvalidGroup, "type in several groups").with(r));
                }
            }
        }
        Ok(GraphRewriteBuilder {
            source,
            builder: TypeBuilder::new(string_type_mapping, alphabetize_properties),
            group_of,
            group_refs: vec![None; groups.len()],
            reconstituted: HashMap::new(),
            unions: HashMap::new(),
        })
    }

    /// The graph being rewritten.
    pub fn source(&self) -> &'a TypeGraph {
        self.source
    }

    /// Returns the node of the new graph designated by the reference, if already added.
    pub fn get(&self, r: TypeRef) -> Option<&TypeNode> {
        self.builder.get(r)
    }

    pub fn reserve(&mut self) -> TypeRef {
        self.builder.reserve()
    }

    pub fn add(
        &mut self,
        ty: Type,
        attributes: TypeAttributes,
        forwarding: Option<TypeRef>,
    ) -> Result<TypeRef> {
        self.builder.add(ty, attributes, forwarding)
    }

    pub fn add_primitive(
        &mut self,
        kind: TypeKind,
        attributes: TypeAttributes,
        forwarding: Option<TypeRef>,
    ) -> Result<TypeRef> {
        self.builder.add_primitive(kind, attributes, forwarding)
    }

    fn group_ref(&mut self, group: usize) -> TypeRef {
        match self.group_refs[group] {
            Some(r) => r,
            None => {
                let r = self.builder.reserve();
                self.group_refs[group] = Some(r);
                r
            }
        }
    }

    /// Maps a type of the source graph into the new graph.
    ///
    /// Members of a group map to the reference of their group. Other types are copied once,
    /// their identity being reserved before their constituents are visited.
    pub fn reconstitute(&mut self, old: TypeRef) -> Result<TypeRef> {
        let source = self.source;
        let node = source
            .get(old)
            .ok_or_else(|| Error::new(Kind::InvalidReference, "not in source graph").with(&old))?;

        if let Some(group) = self.group_of.get(&old).copied() {
            return Ok(self.group_ref(group));
        }
        if let Some(new) = self.reconstituted.get(&old) {
            return Ok(*new);
        }

        if node.kind().is_primitive() {
            let new = self
                .builder
                .add(node.ty.clone(), node.attributes.clone(), None)?;
            self.reconstituted.insert(old, new);
            return Ok(new);
        }

        let forwarding = self.builder.reserve();
        self.reconstituted.insert(old, forwarding);
        let ty = node.ty.try_map_refs(|r| self.reconstitute(r))?;
        self.builder
            .add(ty, node.attributes.clone(), Some(forwarding))
    }

    /// Returns the reference of the group all the given types belong to, if any.
    pub fn lookup_group(&mut self, olds: &IndexSet<TypeRef>) -> Option<TypeRef> {
        let mut groups = olds.iter().map(|r| self.group_of.get(r).copied());
        let first = groups.next()??;
        let same = groups.all(|g| g == Some(first));
        same.then(|| self.group_ref(first))
    }

    /// Returns the type previously registered as the unification of the given types.
    pub fn lookup_union(&self, olds: &IndexSet<TypeRef>) -> Option<TypeRef> {
        self.unions.get(&union_key(olds)).copied()
    }

    /// Registers the type unifying the given types.
    pub fn register_union(&mut self, olds: &IndexSet<TypeRef>, new: TypeRef) {
        self.unions.insert(union_key(olds), new);
    }
}

impl TypeGraph {
    /// Rewrites the graph, replacing every group of types with a single new type.
    ///
    /// `make_replacement` is invoked once per group with the forwarding reference reserved for
    /// that group, and must resolve it. All other reachable types are copied over.
    pub fn rewrite<E, F>(
        &self,
        label: &str,
        string_type_mapping: &StringTypeMapping,
        alphabetize_properties: bool,
        groups: &[Vec<TypeRef>],
        mut make_replacement: F,
    ) -> std::result::Result<TypeGraph, E>
    where
        E: From<Error>,
        F: FnMut(&mut GraphRewriteBuilder<'_>, &[TypeRef], TypeRef) -> std::result::Result<TypeRef, E>,
    {
        log::debug!("{label}: rewriting {} groups of types", groups.len());

        let mut rewriter = GraphRewriteBuilder::new(
            self,
            groups,
            string_type_mapping.clone(),
            alphabetize_properties,
        )?;

        for (index, group) in groups.iter().enumerate() {
            let forwarding = rewriter.group_ref(index);
            let replacement = make_replacement(&mut rewriter, group, forwarding)?;
            if replacement != forwarding || !rewriter.builder.is_resolved(forwarding) {
                return Err(Error::new(Kind::InvalidReplacement, "forwarding reference not resolved")
                    .with(&label)
                    .with(group)
                    .into());
            }
        }

        for (name, r) in self.top_levels() {
            let new = rewriter.reconstitute(*r)?;
            rewriter.builder.add_top_level(name.clone(), new)?;
        }

        let graph = rewriter.builder.finish()?;
        log::debug!("{label}: {} types before, {} after", self.len(), graph.len());
        Ok(graph)
    }
}
