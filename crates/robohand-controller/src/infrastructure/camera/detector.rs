//! Landmark feed from a hand-detector child process.
//!
//! The detector is any program that prints `READY` once its model is loaded
//! and then one JSON frame per line (see the [module docs](super)).  The
//! controller appends `--camera <index>` and
//! `--min-detection-confidence <score>` to the configured arguments.
//! `hand_detect.py` at the repository root is the stock MediaPipe detector.
//!
//! The detector runs at camera speed while the modes read at their own pace
//! (mirror sleeps between sends, the game waits on the operator).  A reader
//! thread drains stdout and keeps only the newest frame, so
//! [`FrameFeed::next_frame`] never serves a frame older than the last one
//! the detector produced.

use std::io::BufReader;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

use robohand_core::Frame;
use tracing::{debug, info, trace, warn};

use super::{Camera, FeedError, FrameFeed, LineFeed};

const READY: &str = "READY";

/// Spawns the detector on every [`Camera::open`].
#[derive(Debug, Clone)]
pub struct DetectorCamera {
    program: String,
    args: Vec<String>,
    device_index: u32,
    min_confidence: f32,
}

impl DetectorCamera {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        device_index: u32,
        min_confidence: f32,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            device_index,
            min_confidence,
        }
    }

    fn extra_args(&self) -> [String; 4] {
        [
            "--camera".to_string(),
            self.device_index.to_string(),
            "--min-detection-confidence".to_string(),
            self.min_confidence.to_string(),
        ]
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .args(self.extra_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Camera for DetectorCamera {
    fn open(&self) -> Result<Box<dyn FrameFeed>, FeedError> {
        info!(program = %self.program, device = self.device_index, "starting hand detector");

        let mut child = self
            .command()
            .spawn()
            .map_err(|e| FeedError::Unavailable(format!("cannot start {}: {e}", self.program)))?;

        let Some(stdout) = child.stdout.take() else {
            kill(&mut child);
            return Err(FeedError::Unavailable("detector stdout not captured".to_string()));
        };

        let mut lines = LineFeed::new(BufReader::new(stdout), self.min_confidence);
        let banner = match lines.read_raw_line() {
            Ok(line) => line.map(|line| line.trim().to_string()),
            Err(e) => {
                kill(&mut child);
                return Err(e);
            }
        };
        if banner.as_deref() != Some(READY) {
            kill(&mut child);
            return Err(FeedError::Unavailable(match banner {
                Some(other) => format!("detector did not signal {READY}, got {other:?}"),
                None => "detector exited before signalling ready".to_string(),
            }));
        }
        info!("hand detector ready");

        let latest = Arc::new(LatestFrame::default());
        let pump = Arc::clone(&latest);
        let spawned = thread::Builder::new()
            .name("detector-reader".to_string())
            .spawn(move || pump_frames(lines, &pump));
        if let Err(e) = spawned {
            kill(&mut child);
            return Err(FeedError::Unavailable(format!("cannot start reader thread: {e}")));
        }

        Ok(Box::new(DetectorFeed { child, latest }))
    }

    fn describe(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.extend(self.extra_args());
        parts.join(" ")
    }
}

/// Single-slot mailbox between the reader thread and the mode.
#[derive(Default)]
struct LatestFrame {
    slot: Mutex<Slot>,
    changed: Condvar,
}

#[derive(Default)]
struct Slot {
    /// Newest unread result.  A newer one replaces it.
    latest: Option<Result<Frame, FeedError>>,
    /// Set once the pipe closes or breaks.
    finished: Option<FeedError>,
    /// Results replaced before anyone read them.
    dropped: u64,
}

fn pump_frames(mut lines: LineFeed<BufReader<ChildStdout>>, latest: &LatestFrame) {
    loop {
        let result = lines.next_frame();
        let Ok(mut slot) = latest.slot.lock() else {
            return;
        };
        match result {
            Err(end @ (FeedError::Ended | FeedError::Capture(_))) => {
                slot.finished = Some(end);
                latest.changed.notify_all();
                return;
            }
            other => {
                if slot.latest.replace(other).is_some() {
                    slot.dropped += 1;
                }
            }
        }
        latest.changed.notify_all();
    }
}

/// An open detector process.
struct DetectorFeed {
    child: Child,
    latest: Arc<LatestFrame>,
}

impl FrameFeed for DetectorFeed {
    fn next_frame(&mut self) -> Result<Frame, FeedError> {
        let mut slot = self.latest.slot.lock().map_err(reader_panicked)?;
        loop {
            if let Some(result) = slot.latest.take() {
                if slot.dropped > 0 {
                    trace!(dropped = slot.dropped, "skipped stale detector frames");
                    slot.dropped = 0;
                }
                return result;
            }
            if let Some(end) = &slot.finished {
                return Err(end.clone());
            }
            slot = self.latest.changed.wait(slot).map_err(reader_panicked)?;
        }
    }
}

fn reader_panicked<T>(_: PoisonError<T>) -> FeedError {
    FeedError::Capture("detector reader thread panicked".to_string())
}

impl Drop for DetectorFeed {
    fn drop(&mut self) {
        // The reader thread sees end of input once the child is gone.
        kill(&mut self.child);
        debug!("hand detector stopped");
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        // Already exited.
        debug!("detector kill: {e}");
    }
    if let Err(e) = child.wait() {
        warn!("failed to reap detector process: {e}");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use super::*;

    fn shell(script: &str) -> DetectorCamera {
        DetectorCamera::new("sh", vec!["-c".to_string(), script.to_string()], 0, 0.7)
    }

    /// Prints `READY` then `count` one-hand frames whose handedness is the
    /// frame number.
    fn numbered_frames(count: u32) -> String {
        let points = vec![r#"{"x":0.5,"y":0.5,"z":0.0}"#; 21].join(",");
        let frame = format!(r#"{{"hands":[{{"handedness":"'$i'","landmarks":[{points}]}}]}}"#);
        format!("echo READY; i=1; while [ $i -le {count} ]; do echo '{frame}'; i=$((i+1)); done")
    }

    #[test]
    fn test_reads_frames_after_ready() {
        // Arrange
        let camera = shell(r#"echo READY; echo '{"hands":[]}'"#);

        // Act
        let mut feed = camera.open().expect("detector should start");

        // Assert
        assert_eq!(feed.next_frame(), Ok(Frame::empty()));
        assert_eq!(feed.next_frame(), Err(FeedError::Ended));
    }

    #[test]
    fn test_slow_reader_gets_newest_frame() {
        // Arrange
        let camera = shell(&numbered_frames(200));
        let mut feed = camera.open().expect("detector should start");

        // Act: the reader falls behind while the detector keeps producing.
        std::thread::sleep(Duration::from_millis(1500));
        let frame = feed.next_frame().expect("a frame should be buffered");

        // Assert
        let hand = frame.primary_hand().expect("frame carries a hand");
        assert_eq!(hand.handedness, "200");
        assert_eq!(feed.next_frame(), Err(FeedError::Ended));
    }

    #[test]
    fn test_capture_error_ends_feed_after_last_frame() {
        let script = r#"echo READY; echo '{"hands":[]}'; echo '{"error":"camera read failed"}'"#;
        let camera = shell(script);
        let mut feed = camera.open().expect("detector should start");
        std::thread::sleep(Duration::from_millis(300));

        assert_eq!(feed.next_frame(), Ok(Frame::empty()));
        assert_eq!(
            feed.next_frame(),
            Err(FeedError::Capture("camera read failed".to_string()))
        );
    }

    #[test]
    fn test_missing_ready_line_is_unavailable() {
        let camera = shell("echo 'model not found'");

        let result = camera.open();

        assert!(
            matches!(result, Err(FeedError::Unavailable(msg)) if msg.contains("model not found"))
        );
    }

    #[test]
    fn test_silent_exit_is_unavailable() {
        let camera = shell("exit 1");
        assert!(matches!(camera.open(), Err(FeedError::Unavailable(_))));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let camera = DetectorCamera::new("robohand-no-such-detector", Vec::new(), 0, 0.7);
        assert!(matches!(camera.open(), Err(FeedError::Unavailable(_))));
    }

    #[test]
    fn test_camera_and_confidence_are_appended_to_arguments() {
        let camera = DetectorCamera::new("python3", vec!["hand_detect.py".to_string()], 2, 0.7);
        assert_eq!(
            camera.describe(),
            "python3 hand_detect.py --camera 2 --min-detection-confidence 0.7"
        );
    }
}
