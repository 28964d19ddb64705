//! Merging of classes which describe the same record shape.

mod clique;
mod heuristic;
mod typeset;


pub use clique::{find_similarity_cliques, find_similarity_cliques_with, CliqueOptions};
pub use heuristic::{can_be_combined, REQUIRED_OVERLAP};
pub use typeset::type_sets_can_be_combined;

use crate::config::CombineConfig;
use crate::errors::{Error, Result};
use crate::unify::Unifier;
use indexmap::IndexSet;
use shapefold_model::{AttributeRegistry, TypeGraph, TypeRef};

/// Replaces every group of similar classes with a single merged class.
///
/// Merging classes can make the classes referring to them similar in turn, so rounds are
/// repeated until no clique is left.
pub fn combine_classes(graph: &TypeGraph, config: &CombineConfig) -> Result<TypeGraph> {
    combine_classes_with(graph, config, &AttributeRegistry::standard())
}

/// Same as [`combine_classes`], combining attributes through the given registry.
pub fn combine_classes_with(
    graph: &TypeGraph,
    config: &CombineConfig,
    registry: &AttributeRegistry,
) -> Result<TypeGraph> {
    let options = CliqueOptions {
        include_fixed_classes: config.include_fixed_classes,
        only_with_same_properties: config.only_with_same_properties,
    };
    let unifier = Unifier::new(registry, config.conflate_numbers);

    let cliques = find_similarity_cliques_with(graph, &options)?;
    log::debug!("found {} cliques of classes to combine", cliques.len());
    let mut combined = combine_cliques(graph, config, registry, &unifier, &cliques)?;
    if cliques.is_empty() {
        return Ok(combined);
    }

    let mut classes = class_count(&combined);
    for round in 2.. {
        let cliques = find_similarity_cliques_with(&combined, &options)?;
        if cliques.is_empty() {
            break;
        }
        log::debug!("found {} cliques of classes to combine in round {round}", cliques.len());
        let next = combine_cliques(&combined, config, registry, &unifier, &cliques)?;
        let remaining = class_count(&next);
        if remaining >= classes {
            log::warn!("combining classes stopped at round {round} with {remaining} classes");
            break;
        }
        combined = next;
        classes = remaining;
    }
    Ok(combined)
}

fn class_count(graph: &TypeGraph) -> usize {
    graph.all_named_types_separated().classes.len()
}

/// Rewrites the graph once, replacing each clique with the unification of its members.
fn combine_cliques(
    graph: &TypeGraph,
    config: &CombineConfig,
    registry: &AttributeRegistry,
    unifier: &Unifier<'_>,
    cliques: &[Vec<TypeRef>],
) -> Result<TypeGraph> {
    graph.rewrite(
        "combine classes",
        &config.string_type_mapping,
        config.alphabetize_properties,
        cliques,
        |builder, members, forwarding| {
            if members.is_empty() {
                return Err(Error::EmptyClique);
            }
            log::trace!("combining {members:?} into {forwarding}");
            let source = builder.source();
            let attributes = registry.combine(members.iter().map(|r| source.attributes(*r)));
            let types: IndexSet<TypeRef> = members.iter().copied().collect();
            unifier.unify(builder, &types, attributes, Some(forwarding))
        },
    )
}
