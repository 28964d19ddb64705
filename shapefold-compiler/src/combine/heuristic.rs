use super::typeset::type_sets_can_be_combined;
use crate::errors::{Error, Result};
use shapefold_model::{ClassType, TypeGraph};

/// The share of the larger class's properties the smaller class must have.
pub const REQUIRED_OVERLAP: f64 = 0.75;

/// Decides whether two classes are noisy samples of the same record shape.
///
/// The smaller class may miss a bounded number of the larger class's properties, and common
/// properties must have matching non-null types. The relation is neither symmetric nor
/// transitive.
pub fn can_be_combined(
    graph: &TypeGraph,
    c1: &ClassType,
    c2: &ClassType,
    only_with_same_properties: bool,
) -> Result<bool> {
    let (n1, n2) = (c1.len(), c2.len());
    if only_with_same_properties {
        if n1 != n2 {
            return Ok(false);
        }
    } else if (n1 as f64) < (n2 as f64) * REQUIRED_OVERLAP
        || (n2 as f64) < (n1 as f64) * REQUIRED_OVERLAP
    {
        return Ok(false);
    }

    let (larger, smaller) = if n1 > n2 { (c1, c2) } else { (c2, c1) };
    let min_overlap = (larger.len() as f64 * REQUIRED_OVERLAP).ceil() as usize;
    let max_faults = smaller.len().checked_sub(min_overlap).ok_or_else(|| {
        Error::invariant(format!(
            "negative fault budget: {} properties for an overlap of {min_overlap}",
            smaller.len()
        ))
    })?;

    let mut common = Vec::with_capacity(smaller.len());
    let mut faults = 0;
    for name in smaller.properties.keys() {
        if larger.properties.contains_key(name) {
            common.push(name);
        } else {
            faults += 1;
            if faults > max_faults {
                return Ok(false);
            }
        }
    }

    for name in common {
        let (Some(p1), Some(p2)) = (c1.property(name), c2.property(name)) else {
            return Err(Error::invariant(format!(
                "both classes should have property {name}"
            )));
        };
        let ts1 = graph.non_null_type_cases(p1.type_ref);
        let ts2 = graph.non_null_type_cases(p2.type_ref);
        if ts1.is_empty() && ts2.is_empty() {
            continue;
        }
        if !type_sets_can_be_combined(graph, &ts1, &ts2) {
            return Ok(false);
        }
    }

    Ok(true)
}
