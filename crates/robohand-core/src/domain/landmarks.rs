//! The 21-point hand landmark model.
//!
//! The external detector reports each hand as 21 points at fixed anatomical
//! indices (the MediaPipe hand convention).  Coordinates are normalized to the
//! image: `x` grows to the right, `y` grows **downwards**, both in `[0, 1]`.
//! A fingertip that is "higher" on screen therefore has a *smaller* `y`.
//!
//! ```text
//!          8   12  16  20        tips
//!          7   11  15  19
//!    4     6   10  14  18        PIP joints
//!     3    5    9  13  17        MCP (base) joints
//!      2
//!       1
//!           0                    wrist
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Errors raised when building a hand from raw detector output.
#[derive(Debug, Error, PartialEq)]
pub enum LandmarkError {
    /// The detector returned a point count other than [`LANDMARK_COUNT`].
    #[error("expected {LANDMARK_COUNT} landmarks, got {0}")]
    WrongCount(usize),
}

/// A single normalized landmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist; unused by the classifiers.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// The five fingers, thumb first.  The order matches every 5-element vector
/// sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Index of the fingertip landmark.
    pub const fn tip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// Index of the joint the extension test compares against: the IP joint
    /// for the thumb, the PIP joint (two indices below the tip) otherwise.
    pub const fn pip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_IP,
            Finger::Index => INDEX_PIP,
            Finger::Middle => MIDDLE_PIP,
            Finger::Ring => RING_PIP,
            Finger::Pinky => PINKY_PIP,
        }
    }

    /// Index of the MCP (knuckle) joint where the finger meets the palm.
    pub const fn base(self) -> usize {
        match self {
            Finger::Thumb => 2,
            Finger::Index => INDEX_MCP,
            Finger::Middle => MIDDLE_MCP,
            Finger::Ring => RING_MCP,
            Finger::Pinky => PINKY_MCP,
        }
    }
}

/// One detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub points: [Landmark; LANDMARK_COUNT],
    /// Detector confidence in `[0, 1]`.
    pub score: f32,
    /// `"Left"` or `"Right"` as reported by the detector.
    pub handedness: String,
}

impl HandLandmarks {
    /// Wraps exactly 21 points with a neutral score and handedness.
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self {
            points,
            score: 1.0,
            handedness: String::new(),
        }
    }

    /// A hand with every landmark at the same position.  Handy as a starting
    /// point for [`HandLandmarks::with_point`].
    pub fn uniform(point: Landmark) -> Self {
        Self::new([point; LANDMARK_COUNT])
    }

    /// Returns a copy with the landmark at `index` replaced.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`LANDMARK_COUNT`].  Use the named
    /// index constants (`WRIST`, `INDEX_TIP`, ...) or [`Finger::tip`].
    pub fn with_point(mut self, index: usize, point: Landmark) -> Self {
        self.points[index] = point;
        self
    }

    /// Builds a hand from a detector's point list.
    ///
    /// # Errors
    ///
    /// Returns [`LandmarkError::WrongCount`] unless `points` has exactly 21 entries.
    pub fn from_points(points: &[Landmark]) -> Result<Self, LandmarkError> {
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongCount(points.len()))?;
        Ok(Self::new(points))
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn wrist(&self) -> Landmark {
        self.points[WRIST]
    }

    pub fn tip(&self, finger: Finger) -> Landmark {
        self.points[finger.tip()]
    }

    pub fn pip(&self, finger: Finger) -> Landmark {
        self.points[finger.pip()]
    }

    pub fn base(&self, finger: Finger) -> Landmark {
        self.points[finger.base()]
    }
}

/// The detector's result for one camera frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub hands: Vec<HandLandmarks>,
}

impl Frame {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hand(hand: HandLandmarks) -> Self {
        Self { hands: vec![hand] }
    }

    /// The hand the controller acts on.  The detector is configured for a
    /// single hand, so this is simply the first one reported.
    pub fn primary_hand(&self) -> Option<&HandLandmarks> {
        self.hands.first()
    }
}
