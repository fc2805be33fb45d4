//! Round state machines for both games.
//!
//! Each machine owns its scheduler, tally and generated content. Intents that
//! arrive in a phase that does not accept them are dropped with a `debug!`
//! line; nothing here returns an error to the caller.

mod memory;
mod trivia;

use std::time::Duration;

use arcade_core::model::{
    CategoryId, ComboState, Level, LevelId, LevelParams, RoundOutcome, RoundResult, RoundTally,
};
use arcade_core::rules::{RoundTiming, ScoringRules};
use arcade_core::timer::Scheduler;

pub use memory::{MemoryRound, MemorySnapshot};
pub use trivia::{AnswerFeedback, QuestionView, TriviaRound, TriviaSnapshot};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Menu,
    LevelSelect,
    Countdown,
    /// Memory only: the pattern is being shown.
    Reveal,
    Active,
    Paused,
    Results,
    Failed,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Results | Phase::Failed)
    }

    #[must_use]
    pub fn can_pause(self) -> bool {
        matches!(self, Phase::Countdown | Phase::Reveal | Phase::Active)
    }
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Game-independent part of a round snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundStatus {
    pub phase: Phase,
    pub category: Option<CategoryId>,
    pub level: Option<LevelId>,
    /// Ticks left before play starts; 0 outside the countdown.
    pub countdown: u32,
    pub combo: ComboState,
    /// Time left on the current question or cell.
    pub time_remaining: Option<Duration>,
    /// Item points so far, or the final total once the round is over.
    pub score: u32,
    pub result: Option<RoundResult>,
}

//
// ─── MACHINE CONTRACT ──────────────────────────────────────────────────────────
//

/// Intents shared by both games. Game-specific input (answers, taps) lives
/// on the concrete machines.
pub trait RoundMachine: Send {
    type Params: LevelParams;

    fn status(&self) -> RoundStatus;

    fn phase(&self) -> Phase;

    /// The terminal result, present only in `Results` and `Failed`.
    fn result(&self) -> Option<&RoundResult>;

    /// Level currently snapshotted by the machine.
    fn level(&self) -> Option<&Level<Self::Params>>;

    fn open_level_select(&mut self);

    /// Narrows level selection to one category; `None` clears the filter.
    fn select_category(&mut self, category: Option<CategoryId>);

    /// Snapshots `level`, generates its content and starts the countdown.
    /// Accepted from level select and from a terminal phase.
    fn start(&mut self, level: &Level<Self::Params>);

    fn use_hint(&mut self);

    fn skip(&mut self);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Replays the current level from a terminal phase.
    fn retry(&mut self);

    fn reset_to_menu(&mut self);

    /// Moves the round clock forward, firing every timer that falls due.
    fn advance(&mut self, dt: Duration);
}

//
// ─── SHARED PLUMBING ───────────────────────────────────────────────────────────
//

/// Lifecycle state both machines share: phase bookkeeping, the tally, the
/// countdown and the scheduler.
#[derive(Debug)]
pub(crate) struct RoundCore<P, E> {
    pub(crate) phase: Phase,
    resume_to: Phase,
    pub(crate) category: Option<CategoryId>,
    pub(crate) level: Option<Level<P>>,
    pub(crate) rules: ScoringRules,
    pub(crate) timing: RoundTiming,
    pub(crate) tally: RoundTally,
    pub(crate) timers: Scheduler<E>,
    pub(crate) countdown: u32,
    pub(crate) result: Option<RoundResult>,
}

impl<P: LevelParams, E> RoundCore<P, E> {
    pub(crate) fn new(rules: ScoringRules, timing: RoundTiming) -> Self {
        Self {
            phase: Phase::Menu,
            resume_to: Phase::Menu,
            category: None,
            level: None,
            rules,
            timing,
            tally: RoundTally::new(),
            timers: Scheduler::new(),
            countdown: 0,
            result: None,
        }
    }

    pub(crate) fn ignore(&self, intent: &'static str) {
        tracing::debug!(intent, phase = ?self.phase, "ignored intent");
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
    }

    pub(crate) fn open_level_select(&mut self) {
        if matches!(self.phase, Phase::Menu | Phase::LevelSelect) || self.phase.is_terminal() {
            self.timers.clear();
            self.enter(Phase::LevelSelect);
        } else {
            self.ignore("open_level_select");
        }
    }

    pub(crate) fn select_category(&mut self, category: Option<CategoryId>) {
        if self.phase == Phase::LevelSelect {
            self.category = category;
        } else {
            self.ignore("select_category");
        }
    }

    /// Snapshots the level and resets per-round state. Returns `false` when
    /// the current phase does not accept a new round.
    pub(crate) fn begin(&mut self, level: &Level<P>, tick: E) -> bool {
        if !(self.phase == Phase::LevelSelect || self.phase.is_terminal()) {
            self.ignore("start");
            return false;
        }
        self.timers.clear();
        self.level = Some(level.clone());
        self.tally = RoundTally::new();
        self.result = None;
        self.countdown = self.timing.countdown_ticks;
        self.enter(Phase::Countdown);
        self.timers.after(self.timing.tick, tick);
        tracing::debug!(level = %level.id(), "round started");
        true
    }

    /// Counts one countdown tick. Returns `true` when the countdown is over.
    pub(crate) fn countdown_tick(&mut self, tick: E) -> bool {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            return true;
        }
        self.timers.after(self.timing.tick, tick);
        false
    }

    pub(crate) fn pause(&mut self) {
        if self.phase.can_pause() {
            self.resume_to = self.phase;
            self.timers.pause();
            self.enter(Phase::Paused);
        } else {
            self.ignore("pause");
        }
    }

    pub(crate) fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.timers.resume();
            self.enter(self.resume_to);
        } else {
            self.ignore("resume");
        }
    }

    pub(crate) fn reset_to_menu(&mut self) {
        self.timers.clear();
        self.level = None;
        self.category = None;
        self.tally = RoundTally::new();
        self.result = None;
        self.countdown = 0;
        self.enter(Phase::Menu);
    }

    /// Freezes the tally into a result and parks the machine in a terminal
    /// phase. Every pending timer is dropped.
    pub(crate) fn finish(&mut self, outcome: RoundOutcome) {
        let Some(level) = self.level.as_ref() else {
            return;
        };
        self.timers.clear();
        let result = self.tally.finish(&self.rules, level.id(), outcome);
        tracing::info!(
            level = %level.id(),
            ?outcome,
            score = result.score(),
            accuracy = result.accuracy(),
            "round finished"
        );
        self.result = Some(result);
        self.enter(match outcome {
            RoundOutcome::Completed => Phase::Results,
            RoundOutcome::Failed => Phase::Failed,
        });
    }

    pub(crate) fn status(&self, time_remaining: Option<Duration>) -> RoundStatus {
        let score = self
            .result
            .as_ref()
            .map_or_else(|| self.tally.points(), RoundResult::score);
        let counting = self.phase == Phase::Countdown
            || (self.phase == Phase::Paused && self.resume_to == Phase::Countdown);
        RoundStatus {
            phase: self.phase,
            category: self.category,
            level: self.level.as_ref().map(Level::id),
            countdown: if counting { self.countdown } else { 0 },
            combo: *self.tally.combo(),
            time_remaining,
            score,
            result: self.result.clone(),
        }
    }

    /// Time since `since` on the round clock.
    pub(crate) fn elapsed_since(&self, since: Duration) -> Duration {
        self.timers.now().saturating_sub(since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_live_phases_can_pause() {
        for phase in [Phase::Countdown, Phase::Reveal, Phase::Active] {
            assert!(phase.can_pause());
        }
        for phase in [Phase::Menu, Phase::LevelSelect, Phase::Paused, Phase::Results, Phase::Failed] {
            assert!(!phase.can_pause());
        }
    }

    #[test]
    fn terminal_phases() {
        assert!(Phase::Results.is_terminal());
        assert!(Phase::Failed.is_terminal());
        assert!(!Phase::Active.is_terminal());
    }
}
