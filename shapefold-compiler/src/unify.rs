use crate::errors::{Error, Result};
use enum_map::EnumMap;
use indexmap::{IndexMap, IndexSet};
use shapefold_model::attributes::AttributeRegistry;
use shapefold_model::{
    ClassProperty, ClassType, GraphRewriteBuilder, Type, TypeAttributes, TypeGraph, TypeKind,
    TypeRef,
};
use std::collections::HashSet;

type Contributors = EnumMap<TypeKind, IndexSet<TypeRef>>;

fn absorb(kinds: &mut Contributors, from: TypeKind, into: TypeKind) {
    let moved = std::mem::take(&mut kinds[from]);
    kinds[into].extend(moved);
}

/// Sorts the types by kind, flattening unions and folding kinds that others subsume.
fn contributors(
    source: &TypeGraph,
    types: &IndexSet<TypeRef>,
    conflate_numbers: bool,
) -> Contributors {
    let mut kinds = Contributors::default();
    let mut visited = HashSet::new();
    let mut stack: Vec<TypeRef> = types.iter().rev().copied().collect();
    while let Some(r) = stack.pop() {
        if !visited.insert(r) {
            continue;
        }
        match source.ty(r) {
            Type::Union { members } => stack.extend(members.iter().rev()),
            ty => {
                kinds[ty.kind()].insert(r);
            }
        }
    }

    if !kinds[TypeKind::Any].is_empty() {
        let others: Vec<TypeKind> = kinds
            .iter()
            .filter(|(k, _)| *k != TypeKind::Any)
            .map(|(k, _)| k)
            .collect();
        for kind in others {
            absorb(&mut kinds, kind, TypeKind::Any);
        }
        return kinds;
    }
    if !kinds[TypeKind::String].is_empty() {
        absorb(&mut kinds, TypeKind::Enum, TypeKind::String);
    }
    if conflate_numbers && !kinds[TypeKind::Double].is_empty() {
        absorb(&mut kinds, TypeKind::Integer, TypeKind::Double);
    }
    if !kinds[TypeKind::Map].is_empty() {
        absorb(&mut kinds, TypeKind::Class, TypeKind::Map);
    }
    kinds
}

/// Merges sets of types into single types generalizing them, inside a graph rewrite.
#[derive(Clone, Copy, Debug)]
pub struct Unifier<'r> {
    registry: &'r AttributeRegistry,
    conflate_numbers: bool,
}

impl<'r> Unifier<'r> {
    pub fn new(registry: &'r AttributeRegistry, conflate_numbers: bool) -> Self {
        Unifier {
            registry,
            conflate_numbers,
        }
    }

    /// Unifies the types of the source graph into one type of the new graph.
    ///
    /// The resulting node carries `attributes`. When a forwarding reference is given, it is
    /// resolved to the resulting node. Otherwise, sets of types which are already being unified,
    /// or which get replaced as a group, resolve to the corresponding type, which is how
    /// recursive types terminate.
    pub fn unify(
        &self,
        builder: &mut GraphRewriteBuilder<'_>,
        types: &IndexSet<TypeRef>,
        attributes: TypeAttributes,
        forwarding: Option<TypeRef>,
    ) -> Result<TypeRef> {
        let Some(first) = types.first().copied() else {
            return Err(Error::EmptyClique);
        };

        if forwarding.is_none() {
            if let Some(r) = builder.lookup_group(types) {
                return Ok(r);
            }
            if let Some(r) = builder.lookup_union(types) {
                return Ok(r);
            }
            if types.len() == 1 {
                return Ok(builder.reconstitute(first)?);
            }
        }

        let forwarding = forwarding.unwrap_or_else(|| builder.reserve());
        builder.register_union(types, forwarding);

        let kinds = contributors(builder.source(), types, self.conflate_numbers);
        let present: Vec<(TypeKind, &IndexSet<TypeRef>)> =
            kinds.iter().filter(|(_, refs)| !refs.is_empty()).collect();

        log::trace!(
            "unifying {} types into {forwarding} with {} kinds",
            types.len(),
            present.len()
        );

        match present.as_slice() {
            [(kind, refs)] => self.build(builder, *kind, refs, attributes, forwarding),
            _ => {
                let mut members = IndexSet::new();
                for (kind, refs) in present.iter() {
                    members.insert(self.member(builder, *kind, refs, forwarding)?);
                }
                let ty = Type::Union { members };
                Ok(builder.add(ty, attributes, Some(forwarding))?)
            }
        }
    }

    /// Builds the member of the given kind of the union resolving `forwarding`.
    ///
    /// Members are built directly, as unifying their contributors could resolve to the union
    /// itself when they all get replaced together.
    fn member(
        &self,
        builder: &mut GraphRewriteBuilder<'_>,
        kind: TypeKind,
        refs: &IndexSet<TypeRef>,
        forwarding: TypeRef,
    ) -> Result<TypeRef> {
        if refs.len() == 1 && builder.lookup_group(refs) != Some(forwarding) {
            return Ok(builder.reconstitute(refs[0])?);
        }
        if let Some(r) = builder.lookup_union(refs) {
            return Ok(r);
        }

        let member = builder.reserve();
        builder.register_union(refs, member);
        let source = builder.source();
        let attributes = self
            .registry
            .combine(refs.iter().map(|r| source.attributes(*r)));
        self.build(builder, kind, refs, attributes, member)
    }

    /// Unifies the types with the combination of their own attributes.
    fn unify_set(
        &self,
        builder: &mut GraphRewriteBuilder<'_>,
        types: &IndexSet<TypeRef>,
    ) -> Result<TypeRef> {
        let source = builder.source();
        let attributes = self
            .registry
            .combine(types.iter().map(|r| source.attributes(*r)));
        self.unify(builder, types, attributes, None)
    }

    /// Builds the single type of the given kind generalizing the contributors.
    fn build(
        &self,
        builder: &mut GraphRewriteBuilder<'_>,
        kind: TypeKind,
        refs: &IndexSet<TypeRef>,
        attributes: TypeAttributes,
        forwarding: TypeRef,
    ) -> Result<TypeRef> {
        let source = builder.source();

        let ty = match kind {
            TypeKind::Enum => {
                let cases = refs
                    .iter()
                    .filter_map(|r| match source.ty(*r) {
                        Type::Enum { cases } => Some(cases),
                        _ => None,
                    })
                    .flatten()
                    .cloned()
                    .collect();
                Type::Enum { cases }
            }
            TypeKind::Array => {
                let items: IndexSet<TypeRef> = refs
                    .iter()
                    .filter_map(|r| match source.ty(*r) {
                        Type::Array { items } => Some(*items),
                        _ => None,
                    })
                    .collect();
                Type::Array {
                    items: self.unify_set(builder, &items)?,
                }
            }
            TypeKind::Map => {
                let mut values = IndexSet::new();
                for r in refs.iter() {
                    match source.ty(*r) {
                        Type::Map { values: v } => {
                            values.insert(*v);
                        }
                        Type::Class(class) => {
                            values.extend(class.properties.values().map(|p| p.type_ref));
                        }
                        _ => {}
                    }
                }
                Type::Map {
                    values: self.unify_set(builder, &values)?,
                }
            }
            TypeKind::Class => self.build_class(builder, refs)?,
            TypeKind::Union => {
                return Err(Error::invariant("unions are flattened before unification"))
            }
            _ => {
                return Ok(builder.add_primitive(kind, attributes, Some(forwarding))?);
            }
        };

        Ok(builder.add(ty, attributes, Some(forwarding))?)
    }

    fn build_class(
        &self,
        builder: &mut GraphRewriteBuilder<'_>,
        refs: &IndexSet<TypeRef>,
    ) -> Result<Type> {
        let source = builder.source();
        let classes: Vec<&ClassType> = refs.iter().filter_map(|r| source.class(*r)).collect();

        // Property name to the types it takes, whether it is optional somewhere, and how many
        // classes declare it.
        let mut merged: IndexMap<&str, (IndexSet<TypeRef>, bool, usize)> = IndexMap::new();
        for class in classes.iter() {
            for (name, prop) in class.properties.iter() {
                let entry = merged
                    .entry(name.as_str())
                    .or_insert_with(|| (IndexSet::new(), false, 0));
                entry.0.insert(prop.type_ref);
                entry.1 |= prop.is_optional;
                entry.2 += 1;
            }
        }

        let mut properties = IndexMap::with_capacity(merged.len());
        for (name, (types, optional, count)) in merged {
            let type_ref = self.unify_set(builder, &types)?;
            let is_optional = optional || count < classes.len();
            properties.insert(name.to_owned(), ClassProperty::new(type_ref, is_optional));
        }
        let is_fixed = classes.iter().any(|c| c.is_fixed);

        Ok(Type::Class(ClassType::new(properties, is_fixed)))
    }
}
