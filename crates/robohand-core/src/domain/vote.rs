//! Majority-vote smoothing over a capture window.
//!
//! Single frames are noisy: a hand halfway through forming "scissors" may
//! classify as nothing, or briefly as "paper".  Collecting every frame's
//! classification for a few seconds and keeping the most frequent label gives
//! a much steadier reading.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default capture window for one smoothed classification.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3);

/// Returns the most frequent non-`None` label.
///
/// When two labels tie, the one that reached the winning count first (in
/// sequence order) wins.  An empty sequence, or one with only `None`
/// entries, yields `None`.
///
/// # Examples
///
/// ```rust
/// use robohand_core::{majority, Gesture};
///
/// let labels = [Some(Gesture::Rock), Some(Gesture::Rock), Some(Gesture::Paper)];
/// assert_eq!(majority(labels), Some(Gesture::Rock));
/// assert_eq!(majority(Vec::<Option<Gesture>>::new()), None);
/// ```
pub fn majority<T, I>(labels: I) -> Option<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = Option<T>>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut best: Option<(T, usize)> = None;

    for label in labels.into_iter().flatten() {
        let count = counts.entry(label).or_insert(0);
        *count += 1;
        // Strictly greater: an equal count reached later never displaces the leader.
        if best.map_or(true, |(_, top)| *count > top) {
            best = Some((label, *count));
        }
    }
    best.map(|(label, _)| label)
}

/// Collects classifications until a fixed window has elapsed.
#[derive(Debug, Clone)]
pub struct VoteWindow<T> {
    window: Duration,
    started: Instant,
    labels: Vec<Option<T>>,
}

impl<T: Copy + Eq + Hash> VoteWindow<T> {
    /// Opens a window starting at `started`.
    pub fn new(window: Duration, started: Instant) -> Self {
        Self {
            window,
            started,
            labels: Vec::new(),
        }
    }

    /// Records one frame's classification (including "nothing recognised").
    pub fn push(&mut self, label: Option<T>) {
        self.labels.push(label);
    }

    /// `true` once `now` is at least `window` past the start.
    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.window
    }

    /// Number of frames recorded so far.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The majority label of everything recorded so far.
    pub fn verdict(&self) -> Option<T> {
        majority(self.labels.iter().copied())
    }
}
