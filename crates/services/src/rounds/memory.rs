use std::time::Duration;

use arcade_core::model::{
    CategoryId, CellIndex, DifficultyTier, ItemOutcome, Level, MemoryLevel, MemoryParams, Pattern,
    RoundOutcome, RoundResult,
};
use arcade_core::rules::{RoundTiming, RulesError, ScoringRules};
use arcade_core::timer::TimerHandle;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Phase, RoundCore, RoundMachine, RoundStatus};
use crate::generator::generate_pattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryEvent {
    CountdownTick,
    RevealStep,
    CellTimeout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySnapshot {
    pub status: RoundStatus,
    pub grid_size: u32,
    /// Cell lit by the reveal; `None` between cells and outside the reveal.
    pub lit: Option<CellIndex>,
    pub found: Vec<CellIndex>,
    /// Pattern cells given up by skip or timeout.
    pub missed: Vec<CellIndex>,
    pub wrong: Vec<CellIndex>,
    pub hint: Option<CellIndex>,
    pub cells_left: usize,
    pub mistakes_left: u32,
    /// The whole pattern, shown once the round is over.
    pub pattern: Option<Vec<CellIndex>>,
}

/// Pattern memory round.
///
/// Countdown, then the reveal lights one cell per `reveal_interval` and holds
/// one blank interval before taps are accepted. Each cell has its own
/// countdown that restarts after every accepted tap.
#[derive(Debug)]
pub struct MemoryRound {
    core: RoundCore<MemoryParams, MemoryEvent>,
    rng: StdRng,
    pattern: Option<Pattern>,
    resolved: Vec<bool>,
    found: Vec<CellIndex>,
    missed: Vec<CellIndex>,
    wrong: Vec<CellIndex>,
    /// Pattern cells tapped out of order since the last resolved cell.
    rejected: Vec<CellIndex>,
    reveal_step: usize,
    hint: Option<CellIndex>,
    cell_started: Duration,
    cell_timer: Option<TimerHandle>,
}

impl Default for MemoryRound {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRound {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            core: RoundCore::new(ScoringRules::memory(), RoundTiming::default()),
            rng,
            pattern: None,
            resolved: Vec::new(),
            found: Vec::new(),
            missed: Vec::new(),
            wrong: Vec::new(),
            rejected: Vec::new(),
            reveal_step: 0,
            hint: None,
            cell_started: Duration::ZERO,
            cell_timer: None,
        }
    }

    /// Replaces the scoring and pacing presets.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if either set of rules is invalid.
    pub fn with_rules(mut self, rules: ScoringRules, timing: RoundTiming) -> Result<Self, RulesError> {
        rules.validate()?;
        timing.validate()?;
        self.core.rules = rules;
        self.core.timing = timing;
        Ok(self)
    }

    #[must_use]
    pub fn snapshot(&self) -> MemorySnapshot {
        let lit = if self.core.phase == Phase::Reveal {
            self.pattern
                .as_ref()
                .and_then(|p| p.cells().get(self.reveal_step).copied())
        } else {
            None
        };
        let wrong = self.core.tally.count(ItemOutcome::Wrong);
        MemorySnapshot {
            status: self.status(),
            grid_size: self.core.level.as_ref().map_or(0, |l| l.params().grid_size),
            lit,
            found: self.found.clone(),
            missed: self.missed.clone(),
            wrong: self.wrong.clone(),
            hint: self.hint,
            cells_left: self.resolved.iter().filter(|r| !**r).count(),
            mistakes_left: self.core.timing.mistake_tolerance.saturating_sub(wrong),
            pattern: self
                .pattern
                .as_ref()
                .filter(|_| self.core.phase.is_terminal())
                .map(|p| p.cells().to_vec()),
        }
    }

    /// The generated pattern in reveal order.
    #[must_use]
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// Selects a cell. Taps on cells already found, given up or marked wrong
    /// are no-ops.
    pub fn tap(&mut self, cell: CellIndex) {
        if self.core.phase != Phase::Active {
            self.core.ignore("tap");
            return;
        }
        let Some(pattern) = self.pattern.as_ref() else {
            return;
        };
        let size = pattern.size();
        if cell.value() >= size.saturating_mul(size) {
            tracing::debug!(cell = cell.value(), "tap outside the grid");
            return;
        }
        if self.found.contains(&cell)
            || self.missed.contains(&cell)
            || self.wrong.contains(&cell)
            || self.rejected.contains(&cell)
        {
            return;
        }

        let strict = self
            .core
            .level
            .as_ref()
            .is_some_and(|l| l.params().strict_order);
        let next = self.next_unresolved();
        let hit = pattern
            .position(cell)
            .filter(|p| !self.resolved[*p] && (!strict || Some(*p) == next));
        let in_pattern = pattern.contains(cell);
        let elapsed = self.core.elapsed_since(self.cell_started);
        let tier = self.tier();

        match hit {
            Some(position) => {
                self.resolved[position] = true;
                self.found.push(cell);
                self.rejected.clear();
                let hinted = self.hint == Some(cell);
                if hinted {
                    self.hint = None;
                }
                self.core
                    .tally
                    .record(&self.core.rules, tier, ItemOutcome::Correct, elapsed, hinted);
            }
            None => {
                // Out-of-order pattern cells come back once they are next.
                if in_pattern {
                    self.rejected.push(cell);
                } else {
                    self.wrong.push(cell);
                }
                self.core
                    .tally
                    .record(&self.core.rules, tier, ItemOutcome::Wrong, elapsed, false);
                if self.core.tally.count(ItemOutcome::Wrong) > self.core.timing.mistake_tolerance {
                    self.core.finish(RoundOutcome::Failed);
                    return;
                }
            }
        }
        self.after_item();
    }

    fn tier(&self) -> DifficultyTier {
        self.core
            .level
            .as_ref()
            .map_or(DifficultyTier::Easy, Level::tier)
    }

    fn next_unresolved(&self) -> Option<usize> {
        self.resolved.iter().position(|r| !*r)
    }

    /// Gives up the next unresolved cell.
    fn give_up(&mut self) {
        let Some(position) = self.next_unresolved() else {
            return;
        };
        let Some(cell) = self.pattern.as_ref().and_then(|p| p.cells().get(position).copied()) else {
            return;
        };
        self.resolved[position] = true;
        self.missed.push(cell);
        self.rejected.clear();
        let elapsed = self.core.elapsed_since(self.cell_started);
        let tier = self.tier();
        let hinted = self.hint.take() == Some(cell);
        self.core
            .tally
            .record(&self.core.rules, tier, ItemOutcome::Skipped, elapsed, hinted);
        self.after_item();
    }

    fn after_item(&mut self) {
        if self.next_unresolved().is_none() {
            self.core.finish(RoundOutcome::Completed);
        } else {
            self.restart_cell_timer();
        }
    }

    fn restart_cell_timer(&mut self) {
        if let Some(handle) = self.cell_timer.take() {
            self.core.timers.cancel(handle);
        }
        let Some(limit) = self.core.level.as_ref().map(|l| l.params().time_per_cell) else {
            return;
        };
        self.cell_started = self.core.timers.now();
        self.cell_timer = Some(self.core.timers.after(limit, MemoryEvent::CellTimeout));
    }

    fn reveal_interval(&self) -> Duration {
        self.core
            .level
            .as_ref()
            .map_or(Duration::ZERO, |l| l.params().reveal_interval)
    }

    fn go_active(&mut self) {
        self.core.enter(Phase::Active);
        self.after_item();
    }

    fn on_timer(&mut self, event: MemoryEvent) {
        match event {
            MemoryEvent::CountdownTick => {
                if self.core.countdown_tick(MemoryEvent::CountdownTick) {
                    self.reveal_step = 0;
                    self.core.enter(Phase::Reveal);
                    if self.resolved.is_empty() {
                        self.go_active();
                    } else {
                        let interval = self.reveal_interval();
                        self.core.timers.after(interval, MemoryEvent::RevealStep);
                    }
                }
            }
            MemoryEvent::RevealStep => {
                self.reveal_step += 1;
                // One extra blank step after the last cell.
                if self.reveal_step <= self.resolved.len() {
                    let interval = self.reveal_interval();
                    self.core.timers.after(interval, MemoryEvent::RevealStep);
                } else {
                    self.go_active();
                }
            }
            MemoryEvent::CellTimeout => {
                self.cell_timer = None;
                if self.core.phase == Phase::Active {
                    tracing::debug!("cell countdown expired");
                    self.give_up();
                }
            }
        }
    }
}

impl RoundMachine for MemoryRound {
    type Params = MemoryParams;

    fn status(&self) -> RoundStatus {
        let remaining = self
            .cell_timer
            .and_then(|handle| self.core.timers.remaining(handle));
        self.core.status(remaining)
    }

    fn phase(&self) -> Phase {
        self.core.phase
    }

    fn result(&self) -> Option<&RoundResult> {
        self.core.result.as_ref()
    }

    fn level(&self) -> Option<&MemoryLevel> {
        self.core.level.as_ref()
    }

    fn open_level_select(&mut self) {
        self.core.open_level_select();
    }

    fn select_category(&mut self, category: Option<CategoryId>) {
        self.core.select_category(category);
    }

    fn start(&mut self, level: &MemoryLevel) {
        if !self.core.begin(level, MemoryEvent::CountdownTick) {
            return;
        }
        let pattern = generate_pattern(level.params(), &mut self.rng);
        self.resolved = vec![false; pattern.len()];
        self.pattern = Some(pattern);
        self.found.clear();
        self.missed.clear();
        self.wrong.clear();
        self.rejected.clear();
        self.reveal_step = 0;
        self.hint = None;
        self.cell_timer = None;
    }

    fn use_hint(&mut self) {
        if self.core.phase != Phase::Active || self.hint.is_some() {
            self.core.ignore("use_hint");
            return;
        }
        self.hint = self
            .next_unresolved()
            .and_then(|i| self.pattern.as_ref().and_then(|p| p.cells().get(i).copied()));
    }

    fn skip(&mut self) {
        if self.core.phase == Phase::Active {
            self.give_up();
        } else {
            self.core.ignore("skip");
        }
    }

    fn pause(&mut self) {
        self.core.pause();
    }

    fn resume(&mut self) {
        self.core.resume();
    }

    fn retry(&mut self) {
        if !self.core.phase.is_terminal() {
            self.core.ignore("retry");
            return;
        }
        if let Some(level) = self.core.level.clone() {
            self.start(&level);
        }
    }

    fn reset_to_menu(&mut self) {
        self.core.reset_to_menu();
        self.pattern = None;
        self.resolved.clear();
        self.found.clear();
        self.missed.clear();
        self.wrong.clear();
        self.rejected.clear();
        self.reveal_step = 0;
        self.hint = None;
        self.cell_timer = None;
    }

    fn advance(&mut self, dt: Duration) {
        let deadline = self.core.timers.now() + dt;
        while let Some(event) = self.core.timers.pop_due(deadline) {
            self.on_timer(event);
        }
        self.core.timers.settle(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::catalog::CLASSIC;
    use arcade_core::model::LevelId;

    fn level(length: u32, strict_order: bool) -> MemoryLevel {
        Level::new(
            LevelId::new(4),
            "Classic",
            "",
            CLASSIC,
            DifficultyTier::Easy,
            None,
            MemoryParams {
                grid_size: 4,
                pattern_length: length,
                reveal_interval: Duration::from_millis(500),
                time_per_cell: Duration::from_secs(3),
                strict_order,
            },
        )
        .unwrap()
    }

    /// Countdown (3 s) plus reveal ((length + 1) * 500 ms).
    fn lead_in(length: u32) -> Duration {
        Duration::from_secs(3) + Duration::from_millis(500) * (length + 1)
    }

    fn started(length: u32, strict_order: bool) -> MemoryRound {
        let mut round = MemoryRound::with_seed(23);
        round.open_level_select();
        round.start(&level(length, strict_order));
        round.advance(lead_in(length));
        assert_eq!(round.phase(), Phase::Active);
        round
    }

    fn cells(round: &MemoryRound) -> Vec<CellIndex> {
        round.pattern().unwrap().cells().to_vec()
    }

    fn off_pattern(round: &MemoryRound, n: usize) -> Vec<CellIndex> {
        let pattern = round.pattern().unwrap();
        (0..16)
            .map(CellIndex::new)
            .filter(|c| !pattern.contains(*c))
            .take(n)
            .collect()
    }

    #[test]
    fn reveal_lights_cells_in_draw_order_then_blanks() {
        let mut round = MemoryRound::with_seed(5);
        round.open_level_select();
        round.start(&level(3, false));
        round.advance(Duration::from_secs(3));
        assert_eq!(round.phase(), Phase::Reveal);

        let pattern = cells(&round);
        assert_eq!(round.snapshot().lit, Some(pattern[0]));
        round.advance(Duration::from_millis(500));
        assert_eq!(round.snapshot().lit, Some(pattern[1]));
        round.advance(Duration::from_millis(500));
        assert_eq!(round.snapshot().lit, Some(pattern[2]));
        round.advance(Duration::from_millis(500));
        assert_eq!(round.snapshot().lit, None);
        assert_eq!(round.phase(), Phase::Reveal);

        round.tap(pattern[0]);
        assert!(round.snapshot().found.is_empty());

        round.advance(Duration::from_millis(500));
        assert_eq!(round.phase(), Phase::Active);
    }

    #[test]
    fn finding_every_cell_completes() {
        let mut round = started(4, false);
        let mut pattern = cells(&round);
        pattern.reverse();
        for cell in pattern {
            round.tap(cell);
        }
        assert_eq!(round.phase(), Phase::Results);
        let result = round.result().unwrap();
        assert_eq!(result.correct(), 4);
        assert!(result.is_perfect());
        assert!(round.snapshot().pattern.is_some());
    }

    #[test]
    fn retapping_a_cell_is_a_no_op() {
        let mut round = started(4, false);
        let first = cells(&round)[0];
        let stray = off_pattern(&round, 1)[0];
        round.tap(first);
        round.tap(first);
        round.tap(stray);
        round.tap(stray);
        let snapshot = round.snapshot();
        assert_eq!(snapshot.found, vec![first]);
        assert_eq!(snapshot.wrong, vec![stray]);
        assert_eq!(snapshot.mistakes_left, 1);
    }

    #[test]
    fn third_mistake_fails_the_round() {
        let mut round = started(5, false);
        for cell in off_pattern(&round, 3) {
            round.tap(cell);
        }
        assert_eq!(round.phase(), Phase::Failed);
        assert_eq!(round.result().unwrap().outcome(), RoundOutcome::Failed);
    }

    #[test]
    fn strict_order_rejects_out_of_order_taps() {
        let mut round = started(4, true);
        let pattern = cells(&round);
        round.tap(pattern[1]);
        assert_eq!(round.snapshot().mistakes_left, 1);
        assert!(round.snapshot().found.is_empty());

        for cell in &pattern {
            round.tap(*cell);
        }
        assert_eq!(round.phase(), Phase::Results);
        assert_eq!(round.result().unwrap().correct(), 4);
        assert_eq!(round.result().unwrap().wrong(), 1);
    }

    #[test]
    fn repeated_out_of_order_tap_counts_once() {
        let mut round = started(4, true);
        let pattern = cells(&round);
        for _ in 0..3 {
            round.tap(pattern[1]);
        }
        assert_eq!(round.phase(), Phase::Active);
        assert_eq!(round.snapshot().mistakes_left, 1);

        round.tap(pattern[0]);
        round.tap(pattern[1]);
        assert_eq!(round.snapshot().found, vec![pattern[0], pattern[1]]);
        assert_eq!(round.snapshot().mistakes_left, 1);
    }

    #[test]
    fn cell_countdown_gives_up_the_next_cell() {
        let mut round = started(3, false);
        let pattern = cells(&round);
        round.tap(pattern[0]);
        round.advance(Duration::from_secs(2));
        assert_eq!(round.status().time_remaining, Some(Duration::from_secs(1)));
        round.advance(Duration::from_secs(1));

        let snapshot = round.snapshot();
        assert_eq!(snapshot.missed, vec![pattern[1]]);
        assert_eq!(snapshot.status.combo.current, 0);
        assert_eq!(snapshot.status.time_remaining, Some(Duration::from_secs(3)));

        round.tap(pattern[1]);
        assert_eq!(round.snapshot().found, vec![pattern[0]]);
    }

    #[test]
    fn hint_highlights_next_cell_once() {
        let mut round = started(3, false);
        let pattern = cells(&round);
        round.use_hint();
        assert_eq!(round.snapshot().hint, Some(pattern[0]));
        round.use_hint();
        round.tap(pattern[0]);
        assert!(round.snapshot().hint.is_none());
        assert!(round.core.tally.items()[0].hint_used);
    }

    #[test]
    fn hint_stays_on_its_cell_until_that_cell_is_found() {
        let mut round = started(3, false);
        let pattern = cells(&round);
        round.use_hint();
        round.tap(pattern[1]);
        assert_eq!(round.snapshot().hint, Some(pattern[0]));
        assert!(!round.core.tally.items()[0].hint_used);

        round.tap(pattern[0]);
        assert!(round.snapshot().hint.is_none());
        assert!(round.core.tally.items()[1].hint_used);
    }

    #[test]
    fn pause_during_reveal_freezes_it() {
        let mut round = MemoryRound::with_seed(5);
        round.open_level_select();
        round.start(&level(3, false));
        round.advance(Duration::from_millis(3_250));
        round.pause();
        round.advance(Duration::from_secs(10));
        assert_eq!(round.phase(), Phase::Paused);
        round.resume();
        assert_eq!(round.phase(), Phase::Reveal);
        round.advance(Duration::from_millis(250));
        assert_eq!(round.snapshot().lit, Some(cells(&round)[1]));
    }

    #[test]
    fn reset_clears_board() {
        let mut round = started(3, false);
        round.tap(cells(&round)[0]);
        round.reset_to_menu();
        round.advance(Duration::from_secs(30));
        let snapshot = round.snapshot();
        assert_eq!(snapshot.status.phase, Phase::Menu);
        assert!(snapshot.found.is_empty());
        assert!(round.pattern().is_none());
    }
}
