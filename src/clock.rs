/// Tick pacing.
///
/// A [`GameClock`] hands out at most one tick at a time, and only while it
/// is running. Where the frames come from is a [`FrameSource`]: wall-clock
/// pacing for the real host, a fixed step for tests.
use std::thread;
use std::time::{Duration, Instant};

use crate::entities::GameStatus;

pub trait FrameSource {
    /// Block until the next frame is due and return the raw time since the
    /// previous one.
    fn next_frame(&mut self) -> Duration;

    /// Forget the previous frame, so a restart does not see the idle gap.
    fn reset(&mut self) {}
}

/// Paces frames to a fixed display cadence by sleeping off the remainder
/// of each frame.
#[derive(Debug)]
pub struct RealtimeFrames {
    frame: Duration,
    last: Instant,
}

impl RealtimeFrames {
    pub fn new(frame: Duration) -> Self {
        Self {
            frame,
            last: Instant::now(),
        }
    }
}

impl FrameSource for RealtimeFrames {
    fn next_frame(&mut self) -> Duration {
        let elapsed = self.last.elapsed();
        if elapsed < self.frame {
            thread::sleep(self.frame - elapsed);
        }
        let now = Instant::now();
        let delta = now - self.last;
        self.last = now;
        delta
    }

    fn reset(&mut self) {
        self.last = Instant::now();
    }
}

/// Deterministic frames for tests and replays.
#[derive(Clone, Copy, Debug)]
pub struct FixedStepFrames {
    step: Duration,
}

impl FixedStepFrames {
    pub fn new(step: Duration) -> Self {
        Self { step }
    }

    /// 60 frames per second.
    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_micros(16_667))
    }
}

impl FrameSource for FixedStepFrames {
    fn next_frame(&mut self) -> Duration {
        self.step
    }
}

#[derive(Debug)]
pub struct GameClock<F> {
    frames: F,
    max_delta: Duration,
    scheduled: bool,
    ticks: u64,
}

impl<F: FrameSource> GameClock<F> {
    pub fn new(frames: F, max_delta: Duration) -> Self {
        Self {
            frames,
            max_delta,
            scheduled: false,
            ticks: 0,
        }
    }

    /// Begin ticking. A no-op while already running, so ticks never overlap.
    pub fn start(&mut self) {
        if self.scheduled {
            return;
        }
        self.frames.reset();
        self.scheduled = true;
    }

    /// Cancel the pending tick.
    pub fn stop(&mut self) {
        self.scheduled = false;
    }

    pub fn is_running(&self) -> bool {
        self.scheduled
    }

    /// Run exactly while the game is playing.
    pub fn follow(&mut self, status: GameStatus) {
        if status == GameStatus::Playing {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Wait for the next tick and return its delta in seconds, clamped to
    /// `max_delta`. `None` when stopped.
    pub fn next_tick(&mut self) -> Option<f32> {
        if !self.scheduled {
            return None;
        }
        let raw = self.frames.next_frame();
        self.ticks += 1;
        Some(raw.min(self.max_delta).as_secs_f32())
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }
}
