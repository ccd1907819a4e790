use std::collections::BTreeSet;

use glam::DVec2;
use rand::Rng;

use crate::types::{Charge, SlotId};

/// Parallel per-slot arrays for every vortex in the simulation.
///
/// Slot `i` is described by `positions[i]`, `velocities[i]` and
/// `charges[i]`. Annihilated slots are not removed; they are tombstoned
/// with [`Charge::Vacant`] and recorded in an ordered free list so that
/// injection can hand them out again, lowest index first.
///
/// Invariant: a slot index is in the free list if and only if its charge
/// is [`Charge::Vacant`].
#[derive(Clone, Debug, Default)]
pub struct VortexStore {
    pub(crate) positions: Vec<DVec2>,
    pub(crate) velocities: Vec<DVec2>,
    pub(crate) charges: Vec<Charge>,
    vacant: BTreeSet<SlotId>,
}

impl VortexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from explicit positions and charges.
    ///
    /// Velocities start at zero and every [`Charge::Vacant`] entry is
    /// registered as a reusable slot.
    ///
    /// ### Panics
    /// Panics if `positions` and `charges` have different lengths.
    pub fn from_parts(positions: Vec<DVec2>, charges: Vec<Charge>) -> Self {
        assert_eq!(positions.len(), charges.len());
        let vacant = charges
            .iter()
            .enumerate()
            .filter_map(|(i, c)| if c.is_active() { None } else { Some(i) })
            .collect();
        Self {
            velocities: vec![DVec2::ZERO; positions.len()],
            positions,
            charges,
            vacant,
        }
    }

    /// Places `count` vortices uniformly at random in `[0, domain)²`.
    ///
    /// The first `count / 2` slots are positive and the rest negative, so an
    /// odd count carries one extra negative vortex.
    pub fn random_dipoles(count: usize, domain: f64, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| {
                let x = rng.random_range(0.0..domain);
                let y = rng.random_range(0.0..domain);
                DVec2::new(x, y)
            })
            .collect();
        let charges = (0..count)
            .map(|i| {
                if i < count / 2 {
                    Charge::Positive
                } else {
                    Charge::Negative
                }
            })
            .collect();

        Self::from_parts(positions, charges)
    }

    /// Total number of slots, including tombstones.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.charges.len()
    }

    #[inline]
    pub fn vacancy_count(&self) -> usize {
        self.vacant.len()
    }

    /// Number of slots whose charge is not [`Charge::Vacant`].
    ///
    /// This is also the total unsigned charge of the system.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.capacity() - self.vacancy_count()
    }

    /// Sum of signed charges over all slots.
    pub fn net_charge(&self) -> i64 {
        self.charges.iter().map(|c| c.value() as i64).sum()
    }

    pub fn positions(&self) -> &[DVec2] {
        &self.positions
    }

    pub fn velocities(&self) -> &[DVec2] {
        &self.velocities
    }

    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    #[inline]
    pub fn charge(&self, id: SlotId) -> Charge {
        self.charges[id]
    }

    #[inline]
    pub fn position(&self, id: SlotId) -> DVec2 {
        self.positions[id]
    }

    /// Overwrites the position of a slot.
    pub fn set_position(&mut self, id: SlotId, pos: DVec2) {
        self.positions[id] = pos;
    }

    /// Overwrites the velocity of a slot.
    pub fn set_velocity(&mut self, id: SlotId, vel: DVec2) {
        self.velocities[id] = vel;
    }

    /// Vacant slot indices in ascending order.
    pub fn vacancies(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.vacant.iter().copied()
    }

    /// Positions of all positive vortices.
    pub fn positive_positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.positions_with(Charge::Positive)
    }

    /// Positions of all negative vortices.
    pub fn negative_positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.positions_with(Charge::Negative)
    }

    fn positions_with(&self, charge: Charge) -> impl Iterator<Item = DVec2> + '_ {
        self.positions
            .iter()
            .zip(&self.charges)
            .filter_map(move |(&p, &c)| if c == charge { Some(p) } else { None })
    }

    /// Tombstones a slot.
    ///
    /// Returns `true` if the slot was active. Deactivating a slot that is
    /// already vacant is a no-op.
    pub fn deactivate(&mut self, id: SlotId) -> bool {
        if !self.charges[id].is_active() {
            return false;
        }
        self.charges[id] = Charge::Vacant;
        self.vacant.insert(id);
        true
    }

    /// Fills a vacant slot with a new vortex at rest.
    ///
    /// ### Panics
    /// Panics if `id` is not vacant or `charge` is [`Charge::Vacant`].
    pub fn occupy(&mut self, id: SlotId, pos: DVec2, charge: Charge) {
        assert!(charge.is_active(), "cannot occupy a slot with a tombstone");
        assert!(self.vacant.remove(&id), "slot {id} is still active");
        self.positions[id] = pos;
        self.velocities[id] = DVec2::ZERO;
        self.charges[id] = charge;
    }

    /// Appends a new vortex at rest, growing capacity by one.
    pub fn push(&mut self, pos: DVec2, charge: Charge) -> SlotId {
        let id = self.charges.len();
        self.positions.push(pos);
        self.velocities.push(DVec2::ZERO);
        self.charges.push(charge);
        if !charge.is_active() {
            self.vacant.insert(id);
        }
        id
    }
}
