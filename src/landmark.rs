//! Hand landmark data as produced by a landmark source.
//!
//! A hand is described by 21 landmarks in a fixed anatomical order. The coordinates are in the
//! display (render target) coordinate system unless noted otherwise: X points right, Y points
//! *down*. A smaller Y value therefore means "higher up on the screen".

use std::{error::Error, fmt};

use nalgebra::{Point2, Rotation2, Vector2};

use crate::finger::{Finger, FINGER_JOINTS};

/// Number of landmarks making up a [`Hand`].
pub const NUM_LANDMARKS: usize = 21;

/// A single tracked point on a hand.
///
/// `z` is carried along for completeness, but nothing in this crate reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    #[inline]
    pub const fn with_z(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 2]> for LandmarkPoint {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<[f32; 3]> for LandmarkPoint {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::with_z(x, y, z)
    }
}

/// Names for the hand landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkIdx {
    /// Returns the position of this landmark in a landmark sequence.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Pairs of anatomically adjacent landmarks forming the hand skeleton.
///
/// This is the MediaPipe hand topology: every finger chain starts at the wrist or at the MCP of its
/// neighbour, and the palm is closed by the wrist-pinky edge.
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Thumb:
        (Wrist, ThumbCmc),
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky, and the palm edge back to the wrist:
        (RingFingerMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// Error returned when a landmark sequence is too short to describe a [`Hand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteLandmarks {
    found: usize,
}

impl IncompleteLandmarks {
    /// Returns the number of landmarks that were supplied.
    pub fn found(&self) -> usize {
        self.found
    }
}

impl fmt::Display for IncompleteLandmarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "incomplete landmark data: expected {} landmarks, got {}",
            NUM_LANDMARKS, self.found
        )
    }
}

impl Error for IncompleteLandmarks {}

/// The 21 landmarks of a single detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    points: [LandmarkPoint; NUM_LANDMARKS],
}

impl Hand {
    /// Creates a [`Hand`] from a landmark sequence.
    ///
    /// Returns an error if `points` contains fewer than [`NUM_LANDMARKS`] entries. Any landmarks
    /// past the first [`NUM_LANDMARKS`] are ignored.
    pub fn from_points(points: &[LandmarkPoint]) -> Result<Self, IncompleteLandmarks> {
        let points: &[LandmarkPoint; NUM_LANDMARKS] = points
            .get(..NUM_LANDMARKS)
            .and_then(|points| points.try_into().ok())
            .ok_or(IncompleteLandmarks {
                found: points.len(),
            })?;
        Ok(Self { points: *points })
    }

    /// Returns all landmarks in anatomical order.
    #[inline]
    pub fn points(&self) -> &[LandmarkPoint; NUM_LANDMARKS] {
        &self.points
    }

    /// Returns the position of a named landmark.
    #[inline]
    pub fn landmark(&self, idx: LandmarkIdx) -> LandmarkPoint {
        self.points[idx.index()]
    }

    /// Returns the landmark on the tip of `finger`.
    pub fn fingertip(&self, finger: Finger) -> LandmarkPoint {
        self.landmark(FINGER_JOINTS[finger.index()].0)
    }

    /// Returns the joint directly below the tip of `finger`, which the tip is compared against
    /// when computing finger states.
    pub fn lower_joint(&self, finger: Finger) -> LandmarkPoint {
        self.landmark(FINGER_JOINTS[finger.index()].1)
    }

    /// Computes the clockwise rotation of the palm compared to an upright position.
    ///
    /// A rotation of 0° means that fingers are pointed upwards. Finger state evaluation assumes
    /// an upright hand; this can be used to judge how far off that assumption is.
    pub fn rotation_radians(&self) -> f32 {
        let p = self.landmark(LandmarkIdx::MiddleFingerMcp);
        let finger = Point2::new(p.x, p.y);
        let p = self.landmark(LandmarkIdx::Wrist);
        let wrist = Point2::new(p.x, p.y);

        let rel = wrist - finger;
        Rotation2::rotation_between(&Vector2::y(), &rel).angle()
    }

    /// Scales X and Y coordinates of all landmarks.
    ///
    /// Landmark sources that output normalized coordinates (in range `0.0..=1.0`) can be mapped to
    /// display coordinates by passing the display width and height.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        for p in &mut self.points {
            p.x *= sx;
            p.y *= sy;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// An upright open hand in a 720x560 frame, with all fingers extended.
    pub(crate) fn open_hand() -> Vec<LandmarkPoint> {
        [
            [360.0, 500.0], // wrist
            [320.0, 470.0],
            [290.0, 430.0],
            [270.0, 400.0],
            [255.0, 370.0], // thumb tip
            [330.0, 380.0],
            [325.0, 330.0],
            [322.0, 300.0],
            [320.0, 270.0], // index tip
            [360.0, 375.0],
            [360.0, 320.0],
            [360.0, 285.0],
            [360.0, 255.0], // middle tip
            [390.0, 380.0],
            [393.0, 330.0],
            [395.0, 300.0],
            [397.0, 275.0], // ring tip
            [420.0, 390.0],
            [425.0, 350.0],
            [428.0, 325.0],
            [430.0, 305.0], // pinky tip
        ]
        .into_iter()
        .map(LandmarkPoint::from)
        .collect()
    }

    #[test]
    fn from_points_requires_21() {
        let points = open_hand();
        assert!(Hand::from_points(&points).is_ok());

        let err = Hand::from_points(&points[..20]).unwrap_err();
        assert_eq!(err.found(), 20);
        assert_eq!(
            err.to_string(),
            "incomplete landmark data: expected 21 landmarks, got 20"
        );
        assert_eq!(Hand::from_points(&[]).unwrap_err().found(), 0);
    }

    #[test]
    fn extra_points_are_ignored() {
        let mut points = open_hand();
        points.push(LandmarkPoint::new(-1.0, -1.0));
        let hand = Hand::from_points(&points).unwrap();
        assert_eq!(hand.points()[..], open_hand()[..]);
    }

    #[test]
    fn named_landmarks() {
        let hand = Hand::from_points(&open_hand()).unwrap();
        assert_eq!(hand.landmark(LandmarkIdx::Wrist), LandmarkPoint::new(360.0, 500.0));
        assert_eq!(hand.fingertip(Finger::Index), hand.points()[8]);
        assert_eq!(hand.lower_joint(Finger::Index), hand.points()[7]);
        assert_eq!(hand.fingertip(Finger::Thumb), hand.points()[4]);
        assert_eq!(hand.lower_joint(Finger::Pinky), hand.points()[19]);
    }

    #[test]
    fn connectivity_is_in_bounds() {
        assert_eq!(CONNECTIVITY.len(), 21);
        for (a, b) in CONNECTIVITY {
            assert!(a.index() < NUM_LANDMARKS);
            assert!(b.index() < NUM_LANDMARKS);
            assert_ne!(a, b);
        }
        assert_eq!(LandmarkIdx::PinkyTip.index(), NUM_LANDMARKS - 1);
    }

    #[test]
    fn skeleton_joins_wrist_to_index_knuckle() {
        use LandmarkIdx::*;
        let edges = CONNECTIVITY
            .iter()
            .map(|(a, b)| (a.index(), b.index()))
            .collect::<Vec<_>>();
        assert!(edges.contains(&(0, 5)));
        assert!(edges.contains(&(0, 17)));
        assert!(!edges.contains(&(ThumbCmc.index(), IndexFingerMcp.index())));

        // Every landmark is reachable from the wrist.
        let mut seen = [false; NUM_LANDMARKS];
        seen[Wrist.index()] = true;
        for _ in 0..NUM_LANDMARKS {
            for &(a, b) in &edges {
                if seen[a] || seen[b] {
                    seen[a] = true;
                    seen[b] = true;
                }
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn rotation() {
        let mut points = open_hand();
        points[LandmarkIdx::Wrist.index()] = LandmarkPoint::new(0.0, 100.0);
        points[LandmarkIdx::MiddleFingerMcp.index()] = LandmarkPoint::new(0.0, 0.0);
        let hand = Hand::from_points(&points).unwrap();
        assert_relative_eq!(hand.rotation_radians(), 0.0);

        // Fingers pointing right (wrist on the left).
        points[LandmarkIdx::Wrist.index()] = LandmarkPoint::new(-100.0, 0.0);
        let hand = Hand::from_points(&points).unwrap();
        assert_relative_eq!(
            hand.rotation_radians().abs(),
            std::f32::consts::FRAC_PI_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn transform() {
        let points = (0..21)
            .map(|i| LandmarkPoint::new(i as f32 / 21.0, 0.5))
            .collect::<Vec<_>>();
        let mut hand = Hand::from_points(&points).unwrap();
        hand.scale(720.0, 560.0);
        assert_relative_eq!(hand.landmark(LandmarkIdx::Wrist).x, 0.0);
        assert_relative_eq!(hand.landmark(LandmarkIdx::Wrist).y, 280.0);
        assert_relative_eq!(
            hand.landmark(LandmarkIdx::PinkyTip).x,
            720.0 * 20.0 / 21.0,
            epsilon = 1e-3
        );
    }
}
