/// Identifier for a vortex slot in a [`crate::store::VortexStore`].
///
/// This is an index into the store's parallel arrays. A slot keeps its
/// index for the lifetime of the store; only tombstoned slots are handed
/// out again by injection.
pub type SlotId = usize;

/// Signed circulation carried by a slot.
///
/// [`Charge::Vacant`] is the tombstone left behind by annihilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Charge {
    Positive,
    Negative,
    Vacant,
}

impl Charge {
    /// Numeric sign used by the interaction law: `+1`, `-1` or `0`.
    #[inline]
    pub fn value(self) -> f64 {
        match self {
            Charge::Positive => 1.0,
            Charge::Negative => -1.0,
            Charge::Vacant => 0.0,
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        !matches!(self, Charge::Vacant)
    }

    /// `true` when the product of the two signs is negative.
    ///
    /// A tombstone never opposes anything.
    #[inline]
    pub fn opposes(self, other: Charge) -> bool {
        matches!(
            (self, other),
            (Charge::Positive, Charge::Negative) | (Charge::Negative, Charge::Positive)
        )
    }
}
