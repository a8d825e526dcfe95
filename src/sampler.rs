//! Weighted random choice, shared by class spins, enemy spawns and loot drops.
//!
//! Selection is split from the draw: [`pick_weighted`] maps a unit roll in
//! `[0, 1)` onto the table, and [`weighted_choice`] feeds it from an RNG.

use rand::Rng;

use crate::error::SampleError;

/// Choose the entry whose cumulative weight first reaches `roll * total`.
///
/// Entries are scanned in the given order. Non-positive and non-finite
/// weights count as zero and are never chosen while any positive weight
/// exists. If rounding lets the scan run off the end, the last entry is
/// returned, so a non-empty table always yields one of its own ids.
pub fn pick_weighted<T>(entries: &[(T, f64)], roll: f64) -> Result<&T, SampleError> {
    let (last, _) = entries.last().ok_or(SampleError::Empty)?;

    let total: f64 = entries.iter().map(|(_, w)| effective(*w)).sum();
    let mut remaining = roll.clamp(0.0, 1.0) * total;
    for (id, weight) in entries {
        let weight = effective(*weight);
        if weight <= 0.0 {
            continue;
        }
        remaining -= weight;
        if remaining <= 0.0 {
            return Ok(id);
        }
    }
    Ok(last)
}

/// Draw one id with probability proportional to its weight.
pub fn weighted_choice<'a, T, R>(entries: &'a [(T, f64)], rng: &mut R) -> Result<&'a T, SampleError>
where
    R: Rng + ?Sized,
{
    if entries.is_empty() {
        return Err(SampleError::Empty);
    }
    pick_weighted(entries, rng.gen::<f64>())
}

fn effective(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}
