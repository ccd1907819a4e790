use glam::DVec2;
use rayon::prelude::*;

use crate::{config::SimConfig, store::VortexStore};

/// Applies mutual-friction drag to one velocity.
///
/// `alpha` rotates the velocity against the vortex's own sign; `alphap`
/// shrinks it isotropically. `sign` is the numeric charge of the slot, so
/// tombstones only see the isotropic term.
#[inline]
pub fn dissipate(v: DVec2, sign: f64, alpha: f64, alphap: f64) -> DVec2 {
    DVec2::new(
        v.x + alpha * v.y * sign - alphap * v.x,
        v.y - alpha * v.x * sign - alphap * v.y,
    )
}

/// Applies [`dissipate`] to every slot, active or not.
pub fn apply_dissipation(store: &mut VortexStore, cfg: &SimConfig) {
    let (alpha, alphap) = (cfg.alpha, cfg.alphap);
    store
        .velocities
        .par_iter_mut()
        .zip(store.charges.par_iter())
        .for_each(|(v, q)| *v = dissipate(*v, q.value(), alpha, alphap));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Charge;

    fn store_with_velocities(vels: &[DVec2], charges: Vec<Charge>) -> VortexStore {
        let mut store = VortexStore::from_parts(vec![DVec2::ZERO; vels.len()], charges);
        for (i, &v) in vels.iter().enumerate() {
            store.set_velocity(i, v);
        }
        store
    }

    #[test]
    fn zero_coefficients_leave_velocities_unchanged() {
        let vels = [DVec2::new(1.5, -2.0), DVec2::new(-0.25, 4.0), DVec2::new(3.0, 3.0)];
        let mut store = store_with_velocities(
            &vels,
            vec![Charge::Positive, Charge::Negative, Charge::Vacant],
        );
        let cfg = SimConfig {
            alpha: 0.0,
            alphap: 0.0,
            ..SimConfig::default()
        };

        apply_dissipation(&mut store, &cfg);

        assert_eq!(store.velocities(), &vels);
    }

    #[test]
    fn rotational_drag_is_signed_by_charge() {
        let v = DVec2::new(1.0, 0.0);
        assert_eq!(dissipate(v, 1.0, 0.1, 0.0), DVec2::new(1.0, -0.1));
        assert_eq!(dissipate(v, -1.0, 0.1, 0.0), DVec2::new(1.0, 0.1));
    }

    #[test]
    fn tombstones_only_feel_linear_damping() {
        let mut store = store_with_velocities(&[DVec2::new(2.0, -4.0)], vec![Charge::Vacant]);
        let cfg = SimConfig {
            alpha: 0.3,
            alphap: 0.5,
            ..SimConfig::default()
        };

        apply_dissipation(&mut store, &cfg);

        assert_eq!(store.velocities()[0], DVec2::new(1.0, -2.0));
    }
}
