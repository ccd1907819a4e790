//! Velocity induced on each vortex by every other vortex and its
//! periodic images.
//!
//! The domain is approximated as a 3×3 tile of copies of itself. For a
//! target slot `j` the kernel sums, over every slot `k` and every image
//! offset `s`:
//!
//! ```text
//! d   = p_j - p_k + s
//! v_j += κ / (4π |d|²) · q_k · (-d.y, d.x)
//! ```
//!
//! The single term with `k == j` and `s == 0` is skipped. Images of `j`
//! itself are kept; they cancel in pairs.

use std::f64::consts::PI;

use glam::DVec2;
use rayon::prelude::*;

use crate::{
    config::{SimConfig, TombstoneMotion},
    store::VortexStore,
    types::{Charge, SlotId},
};

/// The nine image offsets `{-D, 0, D}²`, x-major.
pub fn periodic_offsets(domain: f64) -> [DVec2; 9] {
    let shifts = [-domain, 0.0, domain];
    let mut out = [DVec2::ZERO; 9];
    for (i, &sx) in shifts.iter().enumerate() {
        for (j, &sy) in shifts.iter().enumerate() {
            out[i * 3 + j] = DVec2::new(sx, sy);
        }
    }
    out
}

/// Velocity induced on slot `j`, plus the number of terms whose squared
/// distance fell below `min_r2` and was clamped.
///
/// Tombstoned sources contribute nothing and are skipped outright.
pub fn induced_velocity(
    j: SlotId,
    positions: &[DVec2],
    charges: &[Charge],
    offsets: &[DVec2; 9],
    kappa: f64,
    min_r2: f64,
) -> (DVec2, u32) {
    let prefactor = kappa / (4.0 * PI);
    let pj = positions[j];
    let mut v = DVec2::ZERO;
    let mut clamped = 0;

    for (k, (&pk, &qk)) in positions.iter().zip(charges).enumerate() {
        if !qk.is_active() {
            continue;
        }
        let base = pj - pk;
        for &offset in offsets {
            if k == j && offset == DVec2::ZERO {
                continue;
            }
            let d = base + offset;
            let mut r2 = d.length_squared();
            if r2 < min_r2 {
                r2 = min_r2;
                clamped += 1;
            }
            v += (prefactor / r2 * qk.value()) * d.perp();
        }
    }

    (v, clamped)
}

/// Recomputes the velocity of every active slot in parallel.
///
/// Inactive slots keep their previous velocity under
/// [`TombstoneMotion::Stale`] and are zeroed under
/// [`TombstoneMotion::Frozen`].
///
/// ### Returns
/// The total number of clamped pair distances across all slots. A
/// non-zero value means two distinct vortices nearly coincided.
pub fn compute_velocities(store: &mut VortexStore, cfg: &SimConfig) -> u32 {
    let offsets = periodic_offsets(cfg.domain_size);
    let min_r2 = cfg.min_separation_sq();
    let frozen = cfg.tombstone_motion == TombstoneMotion::Frozen;
    let positions = &store.positions;
    let charges = &store.charges;

    store
        .velocities
        .par_iter_mut()
        .enumerate()
        .map(|(j, v)| {
            if !charges[j].is_active() {
                if frozen {
                    *v = DVec2::ZERO;
                }
                return 0;
            }
            let (vel, clamped) =
                induced_velocity(j, positions, charges, &offsets, cfg.kappa, min_r2);
            *v = vel;
            clamped
        })
        .sum()
}
