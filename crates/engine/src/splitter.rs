//! Allocation Splitter — distributes a parent's amount across children.
//!
//! Proportional when usable weights are supplied, even otherwise. The
//! splitter hands back raw shares; rounding to cents and debiting the
//! parent's balance are the assembler's side of the conservation contract.

use std::collections::HashMap;

/// Split `parent_amount` across `children`.
///
/// With a weight map whose clamped (`max(0, w)`) sum over the children is
/// positive, each child gets `parent_amount * w / Σw`; children absent
/// from the map weigh 0. Otherwise every child gets an even share.
/// Empty `children` yields an empty map.
pub fn split(
    parent_amount: f64,
    children: &[String],
    weights: Option<&HashMap<String, f64>>,
) -> HashMap<String, f64> {
    if children.is_empty() {
        return HashMap::new();
    }

    if let Some(weights) = weights {
        let clamped = |c: &String| weights.get(c).copied().unwrap_or(0.0).max(0.0);
        let wsum: f64 = children.iter().map(clamped).sum();
        if wsum > 0.0 {
            return children
                .iter()
                .map(|c| (c.clone(), parent_amount * clamped(c) / wsum))
                .collect();
        }
    }

    let each = parent_amount / children.len() as f64;
    children.iter().map(|c| (c.clone(), each)).collect()
}
