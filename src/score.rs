//! Score, streak and timing bookkeeping for a drill session.
//!
//! Time is passed in as milliseconds from the caller's clock
//! (`performance.now()` in the browser) so the board itself stays pure.
use serde::Serialize;
use tracing::info;

pub const POINTS_PER_CORRECT: u32 = 10;
/// A streak reward fires on every multiple of this many consecutive correct answers.
pub const STREAK_REWARD_EVERY: u32 = 3;

/// Accumulated play time that can be paused and resumed.
#[derive(Clone, Copy, Debug, Default)]
struct Stopwatch {
    accumulated_ms: f64,
    running_since: Option<f64>,
}

impl Stopwatch {
    fn start(&mut self, now: f64) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }
    fn stop(&mut self, now: f64) {
        if let Some(since) = self.running_since.take() {
            self.accumulated_ms += (now - since).max(0.0);
        }
    }
    fn elapsed(&self, now: f64) -> f64 {
        self.accumulated_ms + self.running_since.map_or(0.0, |since| (now - since).max(0.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStats {
    pub score: u32,
    pub streak: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: u32,
    pub average_seconds: u32,
    pub elapsed_ms: f64,
    pub best_score: u32,
    pub best_streak: u32,
}

#[derive(Clone, Debug, Default)]
pub struct ScoreBoard {
    score: u32,
    streak: u32,
    total: u32,
    correct: u32,
    best_score: u32,
    best_streak: u32,
    timer: Stopwatch,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed best records carried over from an earlier session.
    pub fn with_bests(best_score: u32, best_streak: u32) -> Self {
        Self { best_score, best_streak, ..Self::default() }
    }

    /// Returns true when this answer completes a streak milestone.
    pub fn record_correct(&mut self) -> bool {
        self.score += POINTS_PER_CORRECT;
        self.streak += 1;
        self.total += 1;
        self.correct += 1;
        if self.score > self.best_score {
            self.best_score = self.score;
        }
        if self.streak > self.best_streak {
            self.best_streak = self.streak;
        }
        let reward = self.streak % STREAK_REWARD_EVERY == 0;
        if reward {
            info!(streak = self.streak, "streak reward");
        }
        reward
    }

    pub fn record_wrong(&mut self) {
        self.streak = 0;
        self.total += 1;
    }

    pub fn score(&self) -> u32 {
        self.score
    }
    pub fn streak(&self) -> u32 {
        self.streak
    }
    pub fn best_score(&self) -> u32 {
        self.best_score
    }
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Percentage of correct answers, rounded; 0 before any answer.
    pub fn accuracy(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (f64::from(self.correct) / f64::from(self.total) * 100.0).round() as u32
    }

    /// Rounded seconds per answered question.
    pub fn average_seconds(&self, now: f64) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.timer.elapsed(now) / f64::from(self.total) / 1000.0).round() as u32
    }

    pub fn start_timer(&mut self, now: f64) {
        self.timer.start(now);
    }
    pub fn stop_timer(&mut self, now: f64) {
        self.timer.stop(now);
    }
    pub fn timer_running(&self) -> bool {
        self.timer.running_since.is_some()
    }
    pub fn elapsed_ms(&self, now: f64) -> f64 {
        self.timer.elapsed(now)
    }

    /// Clear the running score and timer. Best records survive.
    pub fn reset(&mut self) {
        *self = Self::with_bests(self.best_score, self.best_streak);
    }

    pub fn stats(&self, now: f64) -> ScoreStats {
        ScoreStats {
            score: self.score,
            streak: self.streak,
            total_questions: self.total,
            correct_answers: self.correct,
            accuracy: self.accuracy(),
            average_seconds: self.average_seconds(now),
            elapsed_ms: self.elapsed_ms(now),
            best_score: self.best_score,
            best_streak: self.best_streak,
        }
    }
}

/// `MM:SS` clock text for an elapsed duration.
pub fn format_clock(elapsed_ms: f64) -> String {
    let total_secs = (elapsed_ms.max(0.0) / 1000.0) as u64;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
