use std::time::{Duration, Instant};

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Accumulated shader playback time in seconds.
    pub seconds: f32,
    /// Time since the previous frame in seconds (zero while paused).
    pub delta: f32,
    /// Index of the frame being rendered.
    pub frame: u32,
}

/// Playback clock that accumulates frame deltas.
///
/// Time only advances while the clock is running, so pausing freezes `iTime`
/// without a jump when playback resumes.
#[derive(Debug, Clone)]
pub struct FrameClock {
    seconds: f64,
    last_tick: Option<Instant>,
    frame: u32,
    paused: bool,
}

impl FrameClock {
    pub fn new(paused: bool) -> Self {
        Self {
            seconds: 0.0,
            last_tick: None,
            frame: 0,
            paused,
        }
    }

    /// Advances the clock to `now` and returns the sample for this frame.
    pub fn tick(&mut self, now: Instant) -> TimeSample {
        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);

        let delta = if self.paused {
            0.0
        } else {
            elapsed.as_secs_f64()
        };
        self.seconds += delta;

        let sample = TimeSample {
            seconds: self.seconds as f32,
            delta: delta as f32,
            frame: self.frame,
        };
        if !self.paused {
            self.frame = self.frame.saturating_add(1);
        }
        sample
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Flips the paused flag and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Rewinds to time zero, frame zero. The paused flag is kept.
    pub fn reset(&mut self) {
        self.seconds = 0.0;
        self.frame = 0;
        self.last_tick = None;
    }
}

/// Decides when the next frame may be rendered under an optional FPS cap.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_render: Option<Instant>,
}

impl FrameScheduler {
    /// Non-positive or non-finite caps mean uncapped.
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
        Self {
            interval,
            last_render: None,
        }
    }

    pub fn is_capped(&self) -> bool {
        self.interval.is_some()
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    /// Earliest instant the next frame may start; None when a frame is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_render = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accumulates_deltas() {
        let start = Instant::now();
        let mut clock = FrameClock::new(false);

        let first = clock.tick(start);
        assert_eq!(first.frame, 0);
        assert_eq!(first.seconds, 0.0);
        assert_eq!(first.delta, 0.0);

        let second = clock.tick(start + Duration::from_millis(250));
        assert_eq!(second.frame, 1);
        assert!((second.seconds - 0.25).abs() < 1e-4);
        assert!((second.delta - 0.25).abs() < 1e-4);

        let third = clock.tick(start + Duration::from_millis(400));
        assert_eq!(third.frame, 2);
        assert!((third.seconds - 0.4).abs() < 1e-4);
        assert!((third.delta - 0.15).abs() < 1e-4);
    }

    #[test]
    fn paused_clock_holds_time_and_frame() {
        let start = Instant::now();
        let mut clock = FrameClock::new(false);
        clock.tick(start);
        clock.tick(start + Duration::from_secs(1));

        assert!(clock.toggle_pause());
        let held = clock.tick(start + Duration::from_secs(5));
        assert!((held.seconds - 1.0).abs() < 1e-4);
        assert_eq!(held.delta, 0.0);
        assert_eq!(held.frame, 2);

        assert!(!clock.toggle_pause());
        let resumed = clock.tick(start + Duration::from_millis(5500));
        assert!((resumed.seconds - 1.5).abs() < 1e-4);
        assert_eq!(resumed.frame, 2);
    }

    #[test]
    fn reset_rewinds_but_keeps_pause_state() {
        let start = Instant::now();
        let mut clock = FrameClock::new(true);
        assert!(clock.is_paused());
        assert!(!clock.toggle_pause());
        clock.tick(start);
        clock.tick(start + Duration::from_secs(3));
        assert!(clock.toggle_pause());
        clock.reset();

        assert!(clock.is_paused());
        let sample = clock.tick(start + Duration::from_secs(4));
        assert_eq!(sample.seconds, 0.0);
        assert_eq!(sample.frame, 0);
    }

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let now = Instant::now();
        let mut scheduler = FrameScheduler::new(None);
        assert!(!scheduler.is_capped());
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert!(scheduler.next_deadline().is_none());
    }

    #[test]
    fn zero_fps_means_uncapped() {
        assert!(!FrameScheduler::new(Some(0.0)).is_capped());
        assert!(!FrameScheduler::new(Some(f32::NAN)).is_capped());
    }

    #[test]
    fn capped_scheduler_waits_for_interval() {
        let now = Instant::now();
        let mut scheduler = FrameScheduler::new(Some(10.0));
        assert!(scheduler.ready_for_frame(now));

        scheduler.mark_rendered(now);
        assert!(!scheduler.ready_for_frame(now + Duration::from_millis(50)));
        assert!(scheduler.ready_for_frame(now + Duration::from_millis(100)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(now + Duration::from_millis(100))
        );

        scheduler.reset();
        assert!(scheduler.ready_for_frame(now));
    }
}
