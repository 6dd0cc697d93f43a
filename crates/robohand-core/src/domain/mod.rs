//! Domain entities for RoboHand.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The **domain** is the innermost layer.  It holds the rules that make the
//! application what it is (here: how landmark coordinates become a gesture,
//! who wins a round) and never imports camera, serial, or terminal code.
//! Outer layers depend on it, it depends on nothing, so every rule in here can
//! be unit-tested with hand-built coordinates.

/// Letter filtering for the ASL spelling mode.
pub mod asl;
/// Finger extension flags and joint-angle buckets.
pub mod fingers;
/// Rock-paper-scissors rules, scoreboard, and opponent.
pub mod game;
/// Rock/paper/scissors classification from landmark geometry.
pub mod gesture;
/// The 21-point hand landmark model.
pub mod landmarks;
/// Operating modes and the operator's menu tokens.
pub mod mode;
/// Majority-vote smoothing over a capture window.
pub mod vote;
