//! Finger extension flags and joint-angle buckets.
//!
//! Both representations are recomputed from scratch for every frame.  There
//! is no hysteresis: a fingertip hovering right at its joint's height will
//! flip state from one frame to the next.


use crate::domain::landmarks::{Finger, HandLandmarks};

/// Servo angle for an extended finger in the binary mirror encoding.
pub const EXTENDED_DEGREES: u16 = 90;

/// Default band (in normalized image height) inside which a fingertip level
/// with its joint counts as half bent.
pub const DEFAULT_ANGLE_TOLERANCE: f32 = 0.05;

/// Extended/folded flag per finger, thumb first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    /// Reads the extension flags off a hand.
    ///
    /// The thumb swings sideways, so it is judged on the x axis: extended when
    /// its tip is left of the IP joint.  The other fingers are extended when
    /// the tip sits above the PIP joint two indices back.
    pub fn from_hand(hand: &HandLandmarks) -> Self {
        let mut flags = [false; 5];
        for (slot, finger) in flags.iter_mut().zip(Finger::ALL) {
            *slot = match finger {
                Finger::Thumb => hand.tip(finger).x < hand.pip(finger).x,
                _ => hand.tip(finger).y < hand.pip(finger).y,
            };
        }
        Self(flags)
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    /// Number of extended fingers.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|f| **f).count()
    }

    /// Servo positions: 90 for an extended finger, 0 for a folded one.
    pub fn servo_degrees(&self) -> [u16; 5] {
        self.0.map(|up| if up { EXTENDED_DEGREES } else { 0 })
    }
}

/// Coarse bend of one finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointAngle {
    Straight,
    Half,
    Folded,
}

impl JointAngle {
    pub const fn degrees(self) -> u16 {
        match self {
            JointAngle::Straight => 0,
            JointAngle::Half => 90,
            JointAngle::Folded => 180,
        }
    }

    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(JointAngle::Straight),
            90 => Some(JointAngle::Half),
            180 => Some(JointAngle::Folded),
            _ => None,
        }
    }
}

/// Angle bucket per finger, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerAngles(pub [JointAngle; 5]);

impl FingerAngles {
    /// Buckets every finger by comparing its tip with the joint below it
    /// (IP for the thumb, PIP for the rest).
    ///
    /// Tip above the joint: straight.  Tip within `tolerance` of the joint:
    /// half bent.  Anything lower: folded.
    pub fn from_hand(hand: &HandLandmarks, tolerance: f32) -> Self {
        let mut angles = [JointAngle::Straight; 5];
        for (slot, finger) in angles.iter_mut().zip(Finger::ALL) {
            let tip = hand.tip(finger).y;
            let joint = hand.pip(finger).y;
            *slot = if tip < joint {
                JointAngle::Straight
            } else if (tip - joint).abs() < tolerance {
                JointAngle::Half
            } else {
                JointAngle::Folded
            };
        }
        Self(angles)
    }

    pub fn degrees(&self) -> [u16; 5] {
        self.0.map(JointAngle::degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::landmarks::{Landmark, THUMB_IP, THUMB_TIP};

    /// All joints on one row; fingers are then lifted or dropped individually.
    fn flat_hand() -> HandLandmarks {
        HandLandmarks::uniform(Landmark::new(0.5, 0.5))
    }

    fn set_tip_y(hand: HandLandmarks, finger: Finger, y: f32) -> HandLandmarks {
        let x = hand.tip(finger).x;
        hand.with_point(finger.tip(), Landmark::new(x, y))
    }

    #[test]
    fn test_long_finger_extended_when_tip_above_pip() {
        // Arrange
        let hand = set_tip_y(flat_hand(), Finger::Index, 0.3);

        // Act
        let states = FingerStates::from_hand(&hand);

        // Assert
        assert!(states.is_extended(Finger::Index));
        assert!(!states.is_extended(Finger::Middle));
    }

    #[test]
    fn test_long_finger_level_with_pip_is_not_extended() {
        let states = FingerStates::from_hand(&flat_hand());
        assert_eq!(states.count(), 0);
    }

    #[test]
    fn test_thumb_uses_horizontal_axis() {
        // Arrange: thumb tip left of its IP joint, but at the same height.
        let hand = flat_hand()
            .with_point(THUMB_IP, Landmark::new(0.40, 0.5))
            .with_point(THUMB_TIP, Landmark::new(0.35, 0.5));

        // Act
        let states = FingerStates::from_hand(&hand);

        // Assert
        assert!(states.is_extended(Finger::Thumb));
    }

    #[test]
    fn test_thumb_ignores_vertical_lift() {
        let hand = flat_hand()
            .with_point(THUMB_IP, Landmark::new(0.40, 0.5))
            .with_point(THUMB_TIP, Landmark::new(0.45, 0.1));
        assert!(!FingerStates::from_hand(&hand).is_extended(Finger::Thumb));
    }

    #[test]
    fn test_servo_degrees_map_flags_to_0_and_90() {
        let states = FingerStates([true, false, true, false, false]);
        assert_eq!(states.servo_degrees(), [90, 0, 90, 0, 0]);
    }

    #[test]
    fn test_angle_buckets_straight_half_folded() {
        // Arrange: index well above, middle just below, ring far below its PIP.
        let mut hand = flat_hand();
        hand = set_tip_y(hand, Finger::Index, 0.30);
        hand = set_tip_y(hand, Finger::Middle, 0.52);
        hand = set_tip_y(hand, Finger::Ring, 0.70);

        // Act
        let angles = FingerAngles::from_hand(&hand, DEFAULT_ANGLE_TOLERANCE);

        // Assert
        assert_eq!(angles.0[Finger::Index as usize], JointAngle::Straight);
        assert_eq!(angles.0[Finger::Middle as usize], JointAngle::Half);
        assert_eq!(angles.0[Finger::Ring as usize], JointAngle::Folded);
        // Pinky is exactly level: not above, inside the band.
        assert_eq!(angles.0[Finger::Pinky as usize], JointAngle::Half);
    }

    #[test]
    fn test_angle_degrees_are_0_90_180() {
        let angles = FingerAngles([
            JointAngle::Straight,
            JointAngle::Half,
            JointAngle::Folded,
            JointAngle::Straight,
            JointAngle::Folded,
        ]);
        assert_eq!(angles.degrees(), [0, 90, 180, 0, 180]);
    }

    #[test]
    fn test_joint_angle_from_degrees_rejects_other_values() {
        assert_eq!(JointAngle::from_degrees(90), Some(JointAngle::Half));
        assert_eq!(JointAngle::from_degrees(45), None);
    }
}
