//! Landmark feed read from a recorded file of detector lines.
//!
//! Lets the whole pipeline run without a camera: record the detector's output
//! once (`python3 hand_detect.py --camera 0 > session.jsonl`, minus the
//! `READY` line, which is tolerated if present) and pass `--replay`.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use robohand_core::Frame;
use tracing::info;

use super::{Camera, FeedError, FrameFeed, LineFeed};

/// Opens the same file from the start on every [`Camera::open`].
#[derive(Debug, Clone)]
pub struct ReplayCamera {
    path: PathBuf,
    min_confidence: f32,
}

impl ReplayCamera {
    pub fn new(path: impl Into<PathBuf>, min_confidence: f32) -> Self {
        Self {
            path: path.into(),
            min_confidence,
        }
    }
}

impl Camera for ReplayCamera {
    fn open(&self) -> Result<Box<dyn FrameFeed>, FeedError> {
        let file = File::open(&self.path)
            .map_err(|e| FeedError::Unavailable(format!("{}: {e}", self.path.display())))?;
        info!(path = %self.path.display(), "replaying recorded frames");
        Ok(Box::new(ReplayFeed {
            lines: LineFeed::new(BufReader::new(file), self.min_confidence),
        }))
    }

    fn describe(&self) -> String {
        format!("replay {}", self.path.display())
    }
}

struct ReplayFeed {
    lines: LineFeed<BufReader<File>>,
}

impl FrameFeed for ReplayFeed {
    fn next_frame(&mut self) -> Result<Frame, FeedError> {
        loop {
            match self.lines.next_frame() {
                // A recording that kept the detector's banner.
                Err(FeedError::Malformed(_)) if self.lines.last_line() == "READY" => continue,
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_file(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("robohand_replay_{}.jsonl", Uuid::new_v4()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_replay_yields_recorded_frames_then_ends() {
        // Arrange
        let path = temp_file("READY\n{\"hands\":[]}\n{\"hands\":[]}\n");
        let camera = ReplayCamera::new(&path, 0.7);

        // Act
        let mut feed = camera.open().unwrap();

        // Assert
        assert_eq!(feed.next_frame(), Ok(Frame::empty()));
        assert_eq!(feed.next_frame(), Ok(Frame::empty()));
        assert_eq!(feed.next_frame(), Err(FeedError::Ended));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let camera = ReplayCamera::new("/nonexistent/robohand/session.jsonl", 0.7);
        assert!(matches!(camera.open(), Err(FeedError::Unavailable(_))));
    }

    #[test]
    fn test_each_open_restarts_from_the_top() {
        let path = temp_file("{\"hands\":[]}\n");
        let camera = ReplayCamera::new(&path, 0.7);

        for _ in 0..2 {
            let mut feed = camera.open().unwrap();
            assert_eq!(feed.next_frame(), Ok(Frame::empty()));
        }

        std::fs::remove_file(&path).ok();
    }
}
