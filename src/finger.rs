//! Extended/flexed finger state estimation.
//!
//! A finger is considered *extended* when its tip is higher up on the screen than the joint right
//! below the tip (`tip.y < joint.y`, since Y points down in display coordinates).
//!
//! This heuristic assumes an upright hand. Hands that are rotated sideways or upside down will get
//! wrong results. [`Hand::rotation_radians`] can be used to detect such hands, but the evaluator
//! intentionally does not compensate for the rotation.

use std::fmt;

use crate::landmark::{Hand, IncompleteLandmarks, LandmarkIdx, LandmarkPoint};

/// The five fingers of a hand, in the order used throughout this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// All fingers, in their fixed order.
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Returns the position of this finger in [`Finger::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the human-readable name of this finger.
    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index",
            Finger::Middle => "Middle",
            Finger::Ring => "Ring",
            Finger::Pinky => "Pinky",
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(tip, lower joint)` landmark pair of each finger, indexed by [`Finger::index`].
///
/// For the thumb the lower joint is the IP joint, for the other fingers it is the DIP joint.
pub const FINGER_JOINTS: [(LandmarkIdx, LandmarkIdx); 5] = {
    use LandmarkIdx::*;
    [
        (ThumbTip, ThumbIp),
        (IndexFingerTip, IndexFingerDip),
        (MiddleFingerTip, MiddleFingerDip),
        (RingFingerTip, RingFingerDip),
        (PinkyTip, PinkyDip),
    ]
};

/// Per-finger extended/flexed states of one hand.
///
/// Always contains exactly one entry per [`Finger`], iterated in the order of [`Finger::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingerStates {
    extended: [bool; 5],
}

impl FingerStates {
    /// Creates a state map from per-finger flags, in the order of [`Finger::ALL`].
    pub const fn from_array(extended: [bool; 5]) -> Self {
        Self { extended }
    }

    /// Returns whether `finger` is extended.
    #[inline]
    pub fn get(&self, finger: Finger) -> bool {
        self.extended[finger.index()]
    }

    /// Returns an iterator over all fingers and their state, in fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (Finger, bool)> + '_ {
        Finger::ALL.into_iter().map(|finger| (finger, self.get(finger)))
    }

    /// Returns the number of entries, which is always 5.
    #[inline]
    pub fn len(&self) -> usize {
        self.extended.len()
    }

    /// Always `false`; present for API symmetry with [`FingerStates::len`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the number of extended fingers.
    pub fn extended_count(&self) -> usize {
        self.extended.iter().filter(|e| **e).count()
    }

    /// Returns the flags in the order of [`Finger::ALL`].
    #[inline]
    pub fn to_array(&self) -> [bool; 5] {
        self.extended
    }
}

impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (finger, extended)) in self.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            let state = if extended { "extended" } else { "flexed" };
            write!(f, "{finger}: {state}")?;
        }
        Ok(())
    }
}

/// Computes finger states from a raw landmark sequence.
///
/// Returns [`IncompleteLandmarks`] if `landmarks` has fewer than 21 entries.
pub fn evaluate(landmarks: &[LandmarkPoint]) -> Result<FingerStates, IncompleteLandmarks> {
    Hand::from_points(landmarks).map(|hand| evaluate_hand(&hand))
}

/// Computes finger states of a [`Hand`].
pub fn evaluate_hand(hand: &Hand) -> FingerStates {
    let mut extended = [false; 5];
    for (finger, out) in Finger::ALL.into_iter().zip(&mut extended) {
        *out = hand.fingertip(finger).y < hand.lower_joint(finger).y;
    }
    FingerStates { extended }
}
