use crate::domain::unit::UnionUnit;
use crate::utils::error::{Result, SetAnalysisError};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Splits N registered sets into their `2^N - 1` disjoint Venn regions: one
/// region per non-empty subset S of the input, with every set in S included
/// and every other input set excluded. The final region is the full
/// intersection of all N sets.
///
/// Pure and deterministic; the input is an ordered set, so the result does
/// not depend on the order the references were originally supplied in.
/// Callers are expected to bound N (see `max_input_sets` in the settings)
/// before paying the exponential cost here.
pub fn decompose(sets: &BTreeSet<Uuid>) -> Result<Vec<UnionUnit>> {
    let n = sets.len();
    if n < 2 {
        return Err(SetAnalysisError::InvalidRequest {
            message: format!("A set analysis requires at least 2 unique sets, got {}", n),
        });
    }

    let ordered: Vec<Uuid> = sets.iter().copied().collect();
    let mut units = Vec::with_capacity((1usize << n) - 1);

    // Proper non-empty subsets, by bitmask over the sorted input.
    for mask in 1u64..((1u64 << n) - 1) {
        let mut intersection = BTreeSet::new();
        let mut exclusions = BTreeSet::new();
        for (i, id) in ordered.iter().enumerate() {
            if mask & (1 << i) != 0 {
                intersection.insert(*id);
            } else {
                exclusions.insert(*id);
            }
        }
        units.push(UnionUnit {
            intersection,
            exclusions,
        });
    }

    // The full intersection excludes nothing.
    units.push(UnionUnit {
        intersection: sets.clone(),
        exclusions: BTreeSet::new(),
    });

    Ok(units)
}
