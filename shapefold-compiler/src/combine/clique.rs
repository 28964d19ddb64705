use super::heuristic::can_be_combined;
use crate::errors::{Error, Result};
use shapefold_model::{ClassType, TypeGraph, TypeRef};

/// Which classes are eligible and how they are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CliqueOptions {
    pub include_fixed_classes: bool,
    pub only_with_same_properties: bool,
}

/// A group of classes to merge, anchored on its prototypes.
#[derive(Debug)]
struct Clique<'g> {
    members: Vec<TypeRef>,
    prototypes: Vec<(TypeRef, &'g ClassType)>,
}

impl<'g> Clique<'g> {
    fn new(seed: TypeRef, class: &'g ClassType) -> Self {
        Clique {
            members: vec![seed],
            prototypes: vec![(seed, class)],
        }
    }

    /// Adds the class to the clique if it matches one of the prototypes.
    ///
    /// An exact match only adds a member, while a fuzzy match also makes the class a prototype.
    fn try_add(
        &mut self,
        graph: &TypeGraph,
        candidate: TypeRef,
        class: &'g ClassType,
        only_with_same_properties: bool,
    ) -> Result<bool> {
        if self
            .prototypes
            .iter()
            .any(|(p, _)| graph.structurally_compatible(*p, candidate, false))
        {
            self.members.push(candidate);
            return Ok(true);
        }

        for (_, prototype) in self.prototypes.iter() {
            if can_be_combined(graph, prototype, class, only_with_same_properties)? {
                self.prototypes.push((candidate, class));
                self.members.push(candidate);
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// Partitions the classes of the graph into groups of classes describing the same shape.
///
/// Classes are visited in reachability order. Every group has at least two members, and a class
/// belongs to at most one group.
pub fn find_similarity_cliques(
    graph: &TypeGraph,
    include_fixed_classes: bool,
) -> Result<Vec<Vec<TypeRef>>> {
    let options = CliqueOptions {
        include_fixed_classes,
        ..Default::default()
    };
    find_similarity_cliques_with(graph, &options)
}

pub fn find_similarity_cliques_with(
    graph: &TypeGraph,
    options: &CliqueOptions,
) -> Result<Vec<Vec<TypeRef>>> {
    let mut candidates = Vec::new();
    for r in graph.all_named_types_separated().classes {
        let class = graph
            .class(r)
            .ok_or_else(|| Error::invariant(format!("candidate {r} is not a class")))?;
        if options.include_fixed_classes || !class.is_fixed {
            candidates.push((r, class));
        }
    }
    log::trace!("{} candidate classes", candidates.len());

    let mut cliques = Vec::new();
    while let Some(&(seed, seed_class)) = candidates.first() {
        let mut clique = Clique::new(seed, seed_class);
        let mut left = Vec::new();
        for &(candidate, class) in candidates[1..].iter() {
            if !clique.try_add(graph, candidate, class, options.only_with_same_properties)? {
                left.push((candidate, class));
            }
        }

        if clique.members.len() > 1 {
            log::trace!("clique of {} classes seeded by {seed}", clique.members.len());
            cliques.push(clique.members);
        }
        candidates = left;
    }

    Ok(cliques)
}
