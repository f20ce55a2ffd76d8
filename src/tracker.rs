use crate::util::ratio;
use crate::window::{SlidingWindow, WINDOW_CAPACITY};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Gaps longer than this between validations are treated as pauses and recorded as zero.
pub const IDLE_GAP: Duration = Duration::from_millis(5000);

/// Time source for the tracker.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One validated attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEvent {
    pub is_correct: bool,
    /// Time since the previous validation, zero after an idle gap or for the first one.
    pub duration: Duration,
    /// Keys pressed since the previous validation.
    pub presses: u32,
}

/// Keystroke and validation counters plus rolling speed/accuracy over the last
/// [`WINDOW_CAPACITY`] validations.
pub struct TypingPerformanceTracker {
    clock: Box<dyn Clock>,
    pub total_press_count: u64,
    pub total_correct_matches: u64,
    pub total_valid_matches: u64,
    current_term_presses: u32,
    last_event_at: Option<Instant>,
    history: SlidingWindow<MatchEvent>,
    window_correct: usize,
    window_duration: Duration,
    window_correct_presses: u64,
}

impl TypingPerformanceTracker {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            total_press_count: 0,
            total_correct_matches: 0,
            total_valid_matches: 0,
            current_term_presses: 0,
            last_event_at: None,
            history: SlidingWindow::new(WINDOW_CAPACITY),
            window_correct: 0,
            window_duration: Duration::ZERO,
            window_correct_presses: 0,
        }
    }

    pub fn on_key_pressed(&mut self) {
        self.total_press_count += 1;
        self.current_term_presses += 1;
        if self.last_event_at.is_none() {
            self.last_event_at = Some(self.clock.now());
        }
    }

    pub fn on_valid(&mut self, is_correct: bool) {
        let first = self.total_valid_matches == 0;
        self.total_valid_matches += 1;
        if is_correct {
            self.total_correct_matches += 1;
        }

        let now = self.clock.now();
        let elapsed = self
            .last_event_at
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        let duration = if first || elapsed > IDLE_GAP {
            Duration::ZERO
        } else {
            elapsed
        };

        let event = MatchEvent {
            is_correct,
            duration,
            presses: self.current_term_presses,
        };
        self.add_to_window(&event);
        if let Some(evicted) = self.history.push(event) {
            self.remove_from_window(&evicted);
        }

        self.last_event_at = Some(now);
        self.current_term_presses = 0;
    }

    fn add_to_window(&mut self, event: &MatchEvent) {
        self.window_duration += event.duration;
        if event.is_correct {
            self.window_correct += 1;
            self.window_correct_presses += u64::from(event.presses);
        }
    }

    fn remove_from_window(&mut self, event: &MatchEvent) {
        self.window_duration = self.window_duration.saturating_sub(event.duration);
        if event.is_correct {
            self.window_correct -= 1;
            self.window_correct_presses -= u64::from(event.presses);
        }
    }

    pub fn history(&self) -> &SlidingWindow<MatchEvent> {
        &self.history
    }

    pub fn current_term_presses(&self) -> u32 {
        self.current_term_presses
    }

    pub fn sliding_accuracy(&self) -> f64 {
        ratio(self.window_correct as f64, self.history.len() as f64)
    }

    /// Correct characters per minute over the window.
    pub fn chars_per_minute(&self) -> f64 {
        let total_ms = self.window_duration.as_secs_f64() * 1000.0;
        if total_ms == 0.0 || self.window_correct == 0 {
            return 0.0;
        }
        self.window_correct as f64 / total_ms * 60_000.0
    }

    /// Average key presses spent on each correct character in the window.
    pub fn presses_per_char(&self) -> f64 {
        ratio(
            self.window_correct_presses as f64,
            self.window_correct as f64,
        )
    }

    pub fn total_accuracy(&self) -> f64 {
        ratio(
            self.total_correct_matches as f64,
            self.total_valid_matches as f64,
        )
    }
}

impl Default for TypingPerformanceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypingPerformanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingPerformanceTracker")
            .field("total_press_count", &self.total_press_count)
            .field("total_correct_matches", &self.total_correct_matches)
            .field("total_valid_matches", &self.total_valid_matches)
            .field("window_len", &self.history.len())
            .finish()
    }
}

/// Hand-advanced clock for deterministic timing. Clones share one instant, so a test can
/// keep a handle after boxing another into a tracker.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
