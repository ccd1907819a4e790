//! Removal of opposite-sign pairs that come within the annihilation radius.
//!
//! Distances are measured under the same 3×3 image tiling as the velocity
//! kernel, so a pair straddling the domain edge is found as well.
//!
//! Both modes resolve pairs in the same order: slots are visited by
//! ascending index, and each still-active slot takes the lowest-indexed
//! still-active partner within range. A slot is removed at most once per
//! sweep, and charges only ever move to [`Charge::Vacant`], so running a
//! sweep twice without motion in between changes nothing.

use glam::DVec2;
use rayon::prelude::*;

use crate::{
    config::{AnnihilationMode, SimConfig},
    kernel::periodic_offsets,
    store::VortexStore,
    types::{Charge, SlotId},
};

/// `true` if any periodic image of `b` lies strictly within `radius_sq`
/// (squared) of `a`.
#[inline]
fn within_radius(a: DVec2, b: DVec2, offsets: &[DVec2; 9], radius_sq: f64) -> bool {
    let base = b - a;
    offsets
        .iter()
        .any(|&o| (base + o).length_squared() < radius_sq)
}

/// Runs one annihilation sweep in the configured mode.
///
/// ### Returns
/// The number of pairs removed. Active count drops by twice this value.
pub fn annihilate(store: &mut VortexStore, cfg: &SimConfig) -> usize {
    match cfg.annihilation_mode {
        AnnihilationMode::Sequential => annihilate_sequential(store, cfg),
        AnnihilationMode::MarkThenCommit => annihilate_mark_then_commit(store, cfg),
    }
}

/// In-place sweep: charges are cleared as soon as a pair is found, and
/// later slots observe the cleared state.
pub fn annihilate_sequential(store: &mut VortexStore, cfg: &SimConfig) -> usize {
    let offsets = periodic_offsets(cfg.domain_size);
    let radius_sq = cfg.annihilation_radius * cfg.annihilation_radius;
    let mut pairs = 0;

    for j in 0..store.capacity() {
        let qj = store.charges[j];
        if !qj.is_active() {
            continue;
        }
        let partner = (0..store.capacity()).find(|&k| {
            k != j
                && qj.opposes(store.charges[k])
                && within_radius(store.positions[j], store.positions[k], &offsets, radius_sq)
        });
        if let Some(k) = partner {
            store.deactivate(j);
            store.deactivate(k);
            pairs += 1;
        }
    }

    pairs
}

/// Two-phase sweep.
///
/// 1. In parallel, every active slot lists its in-range opposite-sign
///    partners against an unchanging snapshot of the charges.
/// 2. Serially, slots are visited in index order and paired with their
///    first partner that is still active.
///
/// Because charges can only become vacant, a partner that is opposite
/// and active during the commit was also opposite in the snapshot, so
/// this produces exactly the pairs [`annihilate_sequential`] would.
pub fn annihilate_mark_then_commit(store: &mut VortexStore, cfg: &SimConfig) -> usize {
    let offsets = periodic_offsets(cfg.domain_size);
    let radius_sq = cfg.annihilation_radius * cfg.annihilation_radius;

    let candidates = mark_candidates(&store.positions, &store.charges, &offsets, radius_sq);

    let mut pairs = 0;
    for (j, partners) in candidates.iter().enumerate() {
        if partners.is_empty() || !store.charges[j].is_active() {
            continue;
        }
        if let Some(&k) = partners.iter().find(|&&k| store.charges[k].is_active()) {
            store.deactivate(j);
            store.deactivate(k);
            pairs += 1;
        }
    }

    pairs
}

fn mark_candidates(
    positions: &[DVec2],
    charges: &[Charge],
    offsets: &[DVec2; 9],
    radius_sq: f64,
) -> Vec<Vec<SlotId>> {
    (0..charges.len())
        .into_par_iter()
        .map(|j| {
            let qj = charges[j];
            if !qj.is_active() {
                return Vec::new();
            }
            (0..charges.len())
                .filter(|&k| {
                    k != j
                        && qj.opposes(charges[k])
                        && within_radius(positions[j], positions[k], offsets, radius_sq)
                })
                .collect()
        })
        .collect()
}
