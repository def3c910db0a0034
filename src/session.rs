//! Round controller tying problems, scoring and the counting animation together.
//!
//! All collaborators are injected at construction; nothing here is global, so a
//! page can run several sessions or a test can pin every random choice.
use tracing::{info, warn};

use crate::layout::{LayoutError, LayoutWarning, lay_out};
use crate::problem::{AnswerCheck, Problem, ProblemGenerator, check_answer};
use crate::reveal::{RenderSink, RevealQueue};
use crate::score::{ScoreBoard, ScoreStats};
use crate::settings::{Settings, SettingsError};
use crate::tokens::{CategoryTokens, Lcg, RandomSource, TokenPair, TokenSupplier};

/// Pause before the next problem after a correct answer.
pub const NEXT_ROUND_AFTER_CORRECT_MS: f64 = 1_500.0;
/// Longer pause after a wrong answer so the correct one can be read.
pub const NEXT_ROUND_AFTER_WRONG_MS: f64 = 2_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Input was blank; nothing was scored.
    Empty,
    /// The round was already answered (or none is active).
    Ignored,
    Correct { streak: u32, streak_reward: bool },
    Wrong { answer: u32 },
}

#[derive(Clone, Copy, Debug)]
pub struct Round {
    pub problem: Problem,
    pub tokens: TokenPair,
    pub counting_shown: bool,
    pub outcome: Option<Outcome>,
    /// Clock time (ms) the problem was put on screen.
    pub started_at: f64,
}

pub struct DrillSession<R, T> {
    settings: Settings,
    generator: ProblemGenerator<R>,
    tokens: T,
    score: ScoreBoard,
    reveals: RevealQueue,
    round: Option<Round>,
    rounds: u64,
    // The render target still shows an old layout and must be wiped on the next tick.
    clear_pending: bool,
    next_round_at: Option<f64>,
}

/// Session used by the browser entry point.
pub type SeededSession = DrillSession<Lcg, CategoryTokens<Lcg>>;

impl SeededSession {
    pub fn seeded(settings: Settings, seed: u64, now: f64) -> Result<Self, SettingsError> {
        // Separate streams so icon picks don't shift the problem sequence.
        let problems = Lcg::new(seed);
        let icons = CategoryTokens::new(Lcg::new(seed.rotate_left(32) ^ 0x9E37_79B9_7F4A_7C15));
        Self::new(settings, problems, icons, now)
    }
}

impl<R: RandomSource, T: TokenSupplier> DrillSession<R, T> {
    pub fn new(settings: Settings, rng: R, tokens: T, now: f64) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut session = Self {
            generator: ProblemGenerator::new(rng, settings.question_type, settings.number_range()),
            settings,
            tokens,
            score: ScoreBoard::new(),
            reveals: RevealQueue::new(),
            round: None,
            rounds: 0,
            clear_pending: false,
            next_round_at: None,
        };
        if settings.enable_timer {
            session.score.start_timer(now);
        }
        session.next_round(now);
        Ok(session)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn stats(&self, now: f64) -> ScoreStats {
        self.score.stats(now)
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.round.as_ref().map(|r| &r.problem)
    }

    /// Counts rounds started so far; changes whenever a new problem is shown.
    pub fn round_number(&self) -> u64 {
        self.rounds
    }

    /// True between an answer and the automatic switch to the next problem.
    pub fn awaiting_next_round(&self) -> bool {
        self.next_round_at.is_some()
    }

    pub fn reveals_pending(&self) -> usize {
        self.reveals.remaining()
    }

    /// Start a fresh problem. Any reveals still queued for the old one are dropped.
    pub fn next_round(&mut self, now: f64) -> Problem {
        self.reveals.cancel();
        self.clear_pending = true;
        self.next_round_at = None;
        self.rounds += 1;
        let problem = self.generator.generate();
        let tokens = self.tokens.pick(problem.operator());
        info!(prompt = %problem.prompt(), round = self.rounds, at = now, "new round");
        self.round = Some(Round { problem, tokens, counting_shown: false, outcome: None, started_at: now });
        problem
    }

    /// Queue the counting animation for the current problem, starting at `now`.
    pub fn show_counting(&mut self, now: f64) -> Result<Vec<LayoutWarning>, LayoutError> {
        let Some(round) = self.round.as_mut() else {
            return Ok(Vec::new());
        };
        let p = round.problem;
        let layout = lay_out(p.operator(), i64::from(p.num1()), i64::from(p.num2()), &self.settings.layout)?;
        for w in &layout.warnings {
            warn!(?w, "counting layout adjusted");
        }
        self.reveals.load(&layout, round.tokens, now);
        round.counting_shown = true;
        self.clear_pending = true;
        Ok(layout.warnings)
    }

    pub fn submit(&mut self, input: &str, now: f64) -> Outcome {
        let Some(round) = self.round.as_mut() else {
            return Outcome::Ignored;
        };
        if round.outcome.is_some() {
            return Outcome::Ignored;
        }
        let outcome = match check_answer(&round.problem, input) {
            AnswerCheck::Empty => return Outcome::Empty,
            AnswerCheck::Correct => {
                let streak_reward = self.score.record_correct();
                self.next_round_at = Some(now + NEXT_ROUND_AFTER_CORRECT_MS);
                Outcome::Correct { streak: self.score.streak(), streak_reward }
            }
            AnswerCheck::Wrong => {
                self.score.record_wrong();
                self.next_round_at = Some(now + NEXT_ROUND_AFTER_WRONG_MS);
                Outcome::Wrong { answer: round.problem.answer() }
            }
        };
        info!(?outcome, score = self.score.score(), "answer submitted");
        round.outcome = Some(outcome);
        outcome
    }

    /// Advance time: switch rounds when due, wipe stale tokens, draw due reveals.
    /// Returns the number of reveals drawn.
    pub fn tick(&mut self, now: f64, sink: &mut dyn RenderSink) -> usize {
        if self.next_round_at.is_some_and(|at| now >= at) {
            self.next_round(now);
        }
        if self.clear_pending {
            sink.clear();
            self.clear_pending = false;
        }
        self.reveals.drain_due(now, sink)
    }

    /// Swap in new settings and restart with a fresh problem.
    pub fn apply_settings(&mut self, settings: Settings, now: f64) -> Result<(), SettingsError> {
        if let Err(e) = settings.validate() {
            warn!(error = %e, "rejected settings");
            return Err(e);
        }
        if settings.enable_timer {
            self.score.start_timer(now);
        } else {
            self.score.stop_timer(now);
        }
        self.generator.configure(settings.question_type, settings.number_range());
        self.settings = settings;
        self.next_round(now);
        Ok(())
    }

    pub fn reset_score(&mut self, now: f64) {
        self.score.reset();
        if self.settings.enable_timer {
            self.score.start_timer(now);
        }
    }
}
