//! Rock/paper/scissors classification from landmark geometry.
//!
//! Only the four long fingers matter; the thumb is ignored.  Each fingertip
//! is compared against a reference point (its own knuckle, or the wrist) and
//! must clear it by `margin` to count as clearly up or clearly down.  A frame
//! that fits none of the three shapes yields no gesture.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::landmarks::{Finger, HandLandmarks, Landmark};

/// Default clearance, in normalized image height, between tip and reference.
pub const DEFAULT_MARGIN: f32 = 0.1;

/// A rock/paper/scissors move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
}

impl Gesture {
    pub const ALL: [Gesture; 3] = [Gesture::Rock, Gesture::Paper, Gesture::Scissors];

    pub const fn as_str(self) -> &'static str {
        match self {
            Gesture::Rock => "rock",
            Gesture::Paper => "paper",
            Gesture::Scissors => "scissors",
        }
    }

    /// The move this one defeats.
    pub const fn beats(self) -> Gesture {
        match self {
            Gesture::Rock => Gesture::Scissors,
            Gesture::Scissors => Gesture::Paper,
            Gesture::Paper => Gesture::Rock,
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gesture {
    type Err = ();

    /// Parses `rock`, `paper`, or `scissors`, ignoring case and surrounding
    /// whitespace.
    fn from_str(s: &str) -> Result<Self, ()> {
        let s = s.trim();
        Gesture::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// What a fingertip is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference {
    /// The finger's own MCP joint.
    #[default]
    FingerBase,
    /// Landmark 0 for every finger.
    Wrist,
}

/// Threshold classifier for the three game gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureClassifier {
    pub margin: f32,
    pub reference: Reference,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            reference: Reference::FingerBase,
        }
    }
}

/// Vertical position of one fingertip relative to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lift {
    Up,
    Down,
    Unclear,
}

impl GestureClassifier {
    pub fn new(margin: f32, reference: Reference) -> Self {
        Self { margin, reference }
    }

    /// Classifies one hand.
    ///
    /// Paper is checked first (all four fingers up), then rock (all four
    /// down), then scissors (index and middle up, ring and pinky down).
    pub fn classify(&self, hand: &HandLandmarks) -> Option<Gesture> {
        let [index, middle, ring, pinky] = [
            Finger::Index,
            Finger::Middle,
            Finger::Ring,
            Finger::Pinky,
        ]
        .map(|finger| self.lift(hand, finger));
        let lifts = [index, middle, ring, pinky];

        let gesture = if lifts.iter().all(|l| *l == Lift::Up) {
            Some(Gesture::Paper)
        } else if lifts.iter().all(|l| *l == Lift::Down) {
            Some(Gesture::Rock)
        } else if index == Lift::Up
            && middle == Lift::Up
            && ring == Lift::Down
            && pinky == Lift::Down
        {
            Some(Gesture::Scissors)
        } else {
            None
        };
        trace!(?lifts, ?gesture, "classified hand");
        gesture
    }

    fn reference_point(&self, hand: &HandLandmarks, finger: Finger) -> Landmark {
        match self.reference {
            Reference::FingerBase => hand.base(finger),
            Reference::Wrist => hand.wrist(),
        }
    }

    fn lift(&self, hand: &HandLandmarks, finger: Finger) -> Lift {
        let tip = hand.tip(finger).y;
        let reference = self.reference_point(hand, finger).y;
        if tip < reference - self.margin {
            Lift::Up
        } else if tip > reference + self.margin {
            Lift::Down
        } else {
            Lift::Unclear
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_Y: f32 = 0.5;

    /// Builds a hand whose knuckles sit at `BASE_Y` and whose fingertips sit
    /// at the given heights (index, middle, ring, pinky).
    fn hand_with_tips(tips: [f32; 4]) -> HandLandmarks {
        let mut hand = HandLandmarks::uniform(Landmark::new(0.5, BASE_Y))
            .with_point(0, Landmark::new(0.5, 0.9));
        for (finger, y) in [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky]
            .into_iter()
            .zip(tips)
        {
            hand = hand.with_point(finger.tip(), Landmark::new(0.5, y));
        }
        hand
    }

    #[test]
    fn test_all_tips_above_margin_is_paper() {
        let hand = hand_with_tips([0.2, 0.25, 0.3, 0.35]);
        assert_eq!(GestureClassifier::default().classify(&hand), Some(Gesture::Paper));
    }

    #[test]
    fn test_all_tips_below_margin_is_rock() {
        let hand = hand_with_tips([0.7, 0.75, 0.7, 0.65]);
        assert_eq!(GestureClassifier::default().classify(&hand), Some(Gesture::Rock));
    }

    #[test]
    fn test_index_middle_up_ring_pinky_down_is_scissors() {
        let hand = hand_with_tips([0.2, 0.2, 0.8, 0.8]);
        assert_eq!(
            GestureClassifier::default().classify(&hand),
            Some(Gesture::Scissors)
        );
    }

    #[test]
    fn test_tip_inside_margin_is_ambiguous() {
        // Pinky only 0.05 above its knuckle: not clearly up with a 0.1 margin.
        let hand = hand_with_tips([0.2, 0.2, 0.2, 0.45]);
        assert_eq!(GestureClassifier::default().classify(&hand), None);
    }

    #[test]
    fn test_zero_margin_accepts_small_lifts() {
        let hand = hand_with_tips([0.45, 0.45, 0.45, 0.45]);
        let classifier = GestureClassifier::new(0.0, Reference::FingerBase);
        assert_eq!(classifier.classify(&hand), Some(Gesture::Paper));
    }

    #[test]
    fn test_mixed_shape_is_none() {
        // Index up, the rest down: a pointing finger, not a game gesture.
        let hand = hand_with_tips([0.2, 0.8, 0.8, 0.8]);
        assert_eq!(GestureClassifier::default().classify(&hand), None);
    }

    #[test]
    fn test_wrist_reference_compares_against_landmark_zero() {
        // Tips below the knuckles but well above the wrist at y = 0.9.
        let hand = hand_with_tips([0.65, 0.65, 0.65, 0.65]);
        let by_base = GestureClassifier::default();
        let by_wrist = GestureClassifier::new(0.1, Reference::Wrist);

        assert_eq!(by_base.classify(&hand), Some(Gesture::Rock));
        assert_eq!(by_wrist.classify(&hand), Some(Gesture::Paper));
    }

    #[test]
    fn test_gesture_parses_case_insensitively() {
        assert_eq!(" Rock ".parse::<Gesture>(), Ok(Gesture::Rock));
        assert_eq!("SCISSORS".parse::<Gesture>(), Ok(Gesture::Scissors));
        assert!("lizard".parse::<Gesture>().is_err());
    }

    #[test]
    fn test_beats_is_cyclic() {
        for g in Gesture::ALL {
            assert_ne!(g.beats(), g);
            assert_eq!(g.beats().beats().beats(), g);
        }
    }
}
