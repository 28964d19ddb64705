use enum_map::EnumMap;
use indexmap::IndexSet;
use shapefold_model::{TypeGraph, TypeKind, TypeRef};

/// Returns whether two sets of non-null types match kind for kind with the exact same shapes.
///
/// Numbers are never conflated here, and types of different kinds never match.
pub fn type_sets_can_be_combined(
    graph: &TypeGraph,
    s1: &IndexSet<TypeRef>,
    s2: &IndexSet<TypeRef>,
) -> bool {
    if s1.len() != s2.len() {
        return false;
    }

    let mut by_kind = EnumMap::<TypeKind, Option<TypeRef>>::default();
    for r in s2.iter() {
        by_kind[graph.kind(*r)] = Some(*r);
    }

    s1.iter().all(|r| match by_kind[graph.kind(*r)] {
        Some(other) => graph.structurally_compatible(*r, other, false),
        None => false,
    })
}
