use std::fmt;

use strum_macros::Display;
use tracing::{debug, info, trace};

use crate::difficulty::Difficulty;
use crate::sources::{Clock, RandomSource};
use crate::util::round_to_hundredths;

/// Distance kept between a freshly drawn target and every edge of the play area.
pub const EDGE_MARGIN: f64 = 0.05;
/// Width of the interval a target coordinate is drawn from.
pub const TARGET_SPAN: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    #[strum(to_string = "not started")]
    NotStarted,
    #[strum(to_string = "active")]
    Active,
    #[strum(to_string = "won")]
    Won,
    #[strum(to_string = "gave up")]
    GaveUp,
}

impl Phase {
    pub fn is_finished(self) -> bool {
        matches!(self, Phase::Won | Phase::GaveUp)
    }
}

/// Position as a fraction of the play area's width and height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a click did to the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The round was not active; nothing changed.
    Ignored,
    Miss,
    Hit,
}

/// Snapshot of everything the presentation layer needs to draw a round
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    phase: Phase,
    target: NormalizedPoint,
    difficulty: Difficulty,
    started_at_ms: Option<u64>,
    ended_at_ms: Option<u64>,
    background_selector: usize,
    round: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::NotStarted,
            target: NormalizedPoint::default(),
            difficulty: Difficulty::default(),
            started_at_ms: None,
            ended_at_ms: None,
            background_selector: 0,
            round: 0,
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Hidden location of the current round. Meaningless before the first start.
    pub fn target(&self) -> NormalizedPoint {
        self.target
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn ended_at_ms(&self) -> Option<u64> {
        self.ended_at_ms
    }

    pub fn background_selector(&self) -> usize {
        self.background_selector
    }

    /// Number of rounds started so far
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Duration of a finished round in seconds, rounded to two decimals.
    /// `None` while the round is in progress or before the first start.
    pub fn elapsed_seconds(&self) -> Option<f64> {
        match (self.phase, self.started_at_ms, self.ended_at_ms) {
            (phase, Some(started), Some(ended)) if phase.is_finished() => Some(
                round_to_hundredths(ended.saturating_sub(started) as f64 / 1000.0),
            ),
            _ => None,
        }
    }
}

/// Square hit test with strict inequality on both axes: a click exactly
/// `tolerance` away on either axis is a miss.
pub fn is_hit(target: NormalizedPoint, click: NormalizedPoint, difficulty: Difficulty) -> bool {
    let tolerance = difficulty.tolerance();
    (click.x - target.x).abs() < tolerance && (click.y - target.y).abs() < tolerance
}

/// Owns the round state and the time/randomness sources that drive it
pub struct Session {
    state: SessionState,
    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(clock: impl Clock + 'static, random: impl RandomSource + 'static) -> Self {
        Self {
            state: SessionState::default(),
            clock: Box::new(clock),
            random: Box::new(random),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.state.elapsed_seconds()
    }

    /// Begins a brand-new round from any phase. An active round is abandoned
    /// without being recorded as a loss.
    pub fn start(&mut self, background_count: usize) {
        let target = NormalizedPoint::new(self.draw_axis(), self.draw_axis());

        self.state.phase = Phase::Active;
        self.state.ended_at_ms = None;
        self.state.started_at_ms = Some(self.clock.now_ms());
        self.state.target = target;
        if let Some(next) = (self.state.background_selector + 1).checked_rem(background_count) {
            self.state.background_selector = next;
        }
        self.state.round += 1;

        debug!(
            round = self.state.round,
            background = self.state.background_selector,
            x = target.x,
            y = target.y,
            "round started"
        );
    }

    fn draw_axis(&mut self) -> f64 {
        EDGE_MARGIN + self.random.next_unit() * TARGET_SPAN
    }

    pub fn resolve_click(&mut self, click: NormalizedPoint) -> ClickOutcome {
        if self.state.phase != Phase::Active {
            return ClickOutcome::Ignored;
        }

        if !is_hit(self.state.target, click, self.state.difficulty) {
            trace!(x = click.x, y = click.y, "miss");
            return ClickOutcome::Miss;
        }

        self.state.phase = Phase::Won;
        self.state.ended_at_ms = Some(self.clock.now_ms());
        info!(
            round = self.state.round,
            difficulty = self.state.difficulty.level(),
            seconds = self.state.elapsed_seconds(),
            "target found"
        );
        ClickOutcome::Hit
    }

    /// Ends the active round without moving the target. Returns false if
    /// there was no active round.
    pub fn give_up(&mut self) -> bool {
        if self.state.phase != Phase::Active {
            return false;
        }

        self.state.phase = Phase::GaveUp;
        self.state.ended_at_ms = Some(self.clock.now_ms());
        info!(
            round = self.state.round,
            seconds = self.state.elapsed_seconds(),
            "gave up"
        );
        true
    }

    /// Applies to every later click, including those in the current round.
    pub fn set_difficulty(&mut self, level: i64) -> Difficulty {
        let difficulty = Difficulty::clamped(level);
        if difficulty != self.state.difficulty {
            debug!(from = self.state.difficulty.level(), to = difficulty.level(), "difficulty changed");
            self.state.difficulty = difficulty;
        }
        difficulty
    }
}
