//! Injection of fresh vortex–antivortex pairs.
//!
//! Each injection lays down a vertical row of dipoles at `x = D / 2`:
//! positive vortices on `npairs` evenly spaced heights starting at `0`,
//! negative vortices on the same number of heights ending at `D`, so the
//! two rows are offset by half a spacing. Every height is jittered by
//! Gaussian noise of standard deviation `injection_jitter * D`.
//!
//! New vortices go into tombstoned slots when there are strictly more
//! than `2 * npairs` of them; otherwise storage grows by `2 * npairs`.

use glam::DVec2;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::{
    config::SimConfig,
    store::VortexStore,
    types::{Charge, SlotId},
};

/// Where an injection placed its vortices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectionOutcome {
    /// Vacant slots were filled; capacity is unchanged.
    Reused { slots: usize },
    /// New slots were appended to the store.
    Grew { appended: usize },
}

impl InjectionOutcome {
    /// Number of vortices added by the injection.
    pub fn added(self) -> usize {
        match self {
            InjectionOutcome::Reused { slots } => slots,
            InjectionOutcome::Grew { appended } => appended,
        }
    }
}

/// `n` evenly spaced samples from `start` to `end`, both inclusive.
///
/// A single sample sits at `start`.
pub fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| if n > 1 && i == n - 1 { end } else { start + step * i as f64 })
}

/// Target positions for one injection row.
///
/// ### Returns
/// `(positive, negative)` positions, `npairs` of each.
pub fn dipole_row(
    npairs: usize,
    domain: f64,
    jitter: f64,
    rng: &mut impl Rng,
) -> (Vec<DVec2>, Vec<DVec2>) {
    if npairs == 0 {
        return (Vec::new(), Vec::new());
    }
    let spacing = domain / (2 * npairs) as f64;
    let sigma = jitter * domain;
    let x = domain / 2.0;

    let mut row = |start: f64, end: f64| -> Vec<DVec2> {
        linspace(start, end, npairs)
            .map(|y| {
                let noise: f64 = rng.sample(StandardNormal);
                DVec2::new(x, y + noise * sigma)
            })
            .collect()
    };

    let positive = row(0.0, domain - spacing);
    let negative = row(spacing, domain);
    (positive, negative)
}

/// Adds `npairs` positive and `npairs` negative vortices to the store.
///
/// Vacant slots are reused, lowest index first, only when there are
/// strictly more than `2 * npairs` of them: the first `npairs` get the
/// positive row, the next `npairs` the negative row, and any other
/// vacancies are left as they are. With `2 * npairs` vacancies or fewer
/// the store grows instead. Either way the new vortices start at rest.
pub fn inject(
    store: &mut VortexStore,
    npairs: usize,
    cfg: &SimConfig,
    rng: &mut impl Rng,
) -> InjectionOutcome {
    let (positive, negative) = dipole_row(npairs, cfg.domain_size, cfg.injection_jitter, rng);
    let new_vortices = positive
        .into_iter()
        .map(|p| (p, Charge::Positive))
        .chain(negative.into_iter().map(|p| (p, Charge::Negative)));

    if store.vacancy_count() > 2 * npairs {
        let slots: Vec<SlotId> = store.vacancies().take(2 * npairs).collect();
        for (id, (pos, charge)) in slots.iter().copied().zip(new_vortices) {
            store.occupy(id, pos, charge);
        }
        return InjectionOutcome::Reused { slots: slots.len() };
    }

    let mut appended = 0;
    for (pos, charge) in new_vortices {
        store.push(pos, charge);
        appended += 1;
    }
    InjectionOutcome::Grew { appended }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    fn quiet_cfg(domain: f64) -> SimConfig {
        SimConfig {
            domain_size: domain,
            injection_jitter: 0.0,
            ..SimConfig::default()
        }
    }

    fn store_with_vacancies(active: usize, vacant: usize) -> VortexStore {
        let charges = (0..active)
            .map(|i| {
                if i % 2 == 0 {
                    Charge::Positive
                } else {
                    Charge::Negative
                }
            })
            .chain(std::iter::repeat_n(Charge::Vacant, vacant))
            .collect::<Vec<_>>();
        VortexStore::from_parts(vec![DVec2::splat(0.1); charges.len()], charges)
    }

    #[test]
    fn linspace_includes_both_ends() {
        let v: Vec<f64> = linspace(0.0, 1.0, 5).collect();
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1).collect::<Vec<_>>(), vec![2.0]);
        assert_eq!(linspace(2.0, 3.0, 0).count(), 0);
    }

    #[test]
    fn rows_are_half_spacing_apart_at_domain_midline() {
        let mut rng = create_rng(0);
        let (pos, neg) = dipole_row(4, 1.0, 0.0, &mut rng);

        let pos_y: Vec<f64> = pos.iter().map(|p| p.y).collect();
        let neg_y: Vec<f64> = neg.iter().map(|p| p.y).collect();
        assert_eq!(pos_y, vec![0.0, 0.875 / 3.0, 1.75 / 3.0, 0.875]);
        assert_eq!(neg_y[0], 0.125);
        assert_eq!(neg_y[3], 1.0);
        assert!(pos.iter().chain(&neg).all(|p| p.x == 0.5));
    }

    #[test]
    fn jitter_perturbs_heights_on_domain_scale() {
        let mut rng = create_rng(5);
        let (pos, _) = dipole_row(50, 1.0, 0.01, &mut rng);
        let mut quiet = create_rng(5);
        let (exact, _) = dipole_row(50, 1.0, 0.0, &mut quiet);

        let max_dev = pos
            .iter()
            .zip(&exact)
            .map(|(a, b)| (a.y - b.y).abs())
            .fold(0.0, f64::max);
        assert!(max_dev > 0.0);
        assert!(max_dev < 0.1);
    }

    #[test]
    fn exactly_two_npairs_vacancies_grows_storage() {
        let mut store = store_with_vacancies(4, 6);
        let mut rng = create_rng(1);

        let outcome = inject(&mut store, 3, &quiet_cfg(1.0), &mut rng);

        assert_eq!(outcome, InjectionOutcome::Grew { appended: 6 });
        assert_eq!(store.capacity(), 16);
        assert_eq!(store.vacancy_count(), 6);
        assert_eq!(store.active_count(), 10);
    }

    #[test]
    fn one_more_vacancy_reuses_lowest_slots() {
        let mut store = store_with_vacancies(4, 7);
        let mut rng = create_rng(1);

        let outcome = inject(&mut store, 3, &quiet_cfg(1.0), &mut rng);

        assert_eq!(outcome, InjectionOutcome::Reused { slots: 6 });
        assert_eq!(store.capacity(), 11);
        assert_eq!(store.vacancies().collect::<Vec<_>>(), vec![10]);
        assert_eq!(&store.charges()[4..7], &[Charge::Positive; 3]);
        assert_eq!(&store.charges()[7..10], &[Charge::Negative; 3]);
        // The leftover vacancy is untouched.
        assert_eq!(store.position(10), DVec2::splat(0.1));
        assert_eq!(store.position(4).x, 0.5);
    }

    #[test]
    fn growth_appends_positive_then_negative_at_rest() {
        let mut store = VortexStore::new();
        let mut rng = create_rng(2);

        inject(&mut store, 2, &quiet_cfg(1.0), &mut rng);

        assert_eq!(
            store.charges(),
            &[
                Charge::Positive,
                Charge::Positive,
                Charge::Negative,
                Charge::Negative
            ]
        );
        assert!(store.velocities().iter().all(|v| *v == DVec2::ZERO));
        assert_eq!(store.net_charge(), 0);
    }

    #[test]
    fn injection_keeps_charge_balance() {
        let mut store = store_with_vacancies(10, 30);
        let mut rng = create_rng(9);
        let before = store.net_charge();

        let outcome = inject(&mut store, 5, &SimConfig::default(), &mut rng);

        assert_eq!(outcome.added(), 10);
        assert_eq!(store.net_charge(), before);
    }

    #[test]
    fn zero_pairs_changes_nothing() {
        let mut store = store_with_vacancies(2, 0);
        let mut rng = create_rng(4);

        let outcome = inject(&mut store, 0, &quiet_cfg(1.0), &mut rng);

        assert_eq!(outcome, InjectionOutcome::Grew { appended: 0 });
        assert_eq!(store.capacity(), 2);
    }
}
