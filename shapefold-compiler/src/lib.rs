pub mod combine;
pub mod config;
pub mod errors;
pub mod unify;

#[cfg(test)]
mod unify_tests;

pub use crate::combine::{
    can_be_combined, combine_classes, combine_classes_with, find_similarity_cliques,
    find_similarity_cliques_with, CliqueOptions,
};
pub use crate::config::CombineConfig;
pub use crate::errors::{Error, Result};
pub use crate::unify::Unifier;
