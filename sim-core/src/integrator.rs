//! Position update and periodic wrap.

use glam::DVec2;

use crate::{
    config::{SimConfig, TombstoneMotion},
    store::VortexStore,
};

/// Moves slots by `velocity * dt`.
///
/// Under [`TombstoneMotion::Stale`] every slot moves, so a tombstone
/// keeps drifting with whatever velocity it last carried. Under
/// [`TombstoneMotion::Frozen`] only active slots move.
pub fn advance(store: &mut VortexStore, cfg: &SimConfig) {
    let dt = cfg.dt;
    let move_all = cfg.tombstone_motion == TombstoneMotion::Stale;
    for ((p, v), q) in store
        .positions
        .iter_mut()
        .zip(&store.velocities)
        .zip(&store.charges)
    {
        if move_all || q.is_active() {
            *p += *v * dt;
        }
    }
}

/// Brings one coordinate back into `[0, domain)` with a single shift.
///
/// Values more than one period outside the domain are only shifted once;
/// a step's displacement is assumed smaller than `domain`.
#[inline]
pub fn wrap_coordinate(x: f64, domain: f64) -> f64 {
    if x >= domain {
        x - domain
    } else if x < 0.0 {
        let w = x + domain;
        // A tiny negative value can round up to exactly `domain`.
        if w >= domain { 0.0 } else { w }
    } else {
        x
    }
}

/// Wraps every slot's position into the periodic domain.
pub fn wrap_positions(store: &mut VortexStore, cfg: &SimConfig) {
    let d = cfg.domain_size;
    for p in &mut store.positions {
        *p = DVec2::new(wrap_coordinate(p.x, d), wrap_coordinate(p.y, d));
    }
}
