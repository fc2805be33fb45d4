//! One game's round machine wired to its catalog and progress ledger.
//!
//! The session is the only thing that moves results into the ledger. Every
//! intent that can end a round awaits the ledger write before returning, so
//! the next read already sees the new progress.

use std::time::Duration;

use arcade_core::Clock;
use arcade_core::catalog::{Catalog, memory_catalog, trivia_catalog};
use arcade_core::model::{CategoryId, CellIndex, LevelId, RoundId};
use arcade_core::rules::ProgressionRules;
use storage::repository::Storage;

use crate::error::SessionError;
use crate::ledger::{MEMORY_PROGRESS_KEY, ProgressLedger, RecordOutcome, TRIVIA_PROGRESS_KEY};
use crate::rounds::{
    MemoryRound, MemorySnapshot, Phase, RoundMachine, TriviaRound, TriviaSnapshot,
};

pub struct GameSession<M: RoundMachine> {
    machine: M,
    catalog: Catalog<M::Params>,
    ledger: ProgressLedger,
    recorded: Option<RoundId>,
    last_outcome: Option<RecordOutcome>,
}

impl<M: RoundMachine> GameSession<M> {
    #[must_use]
    pub fn new(machine: M, catalog: Catalog<M::Params>, ledger: ProgressLedger) -> Self {
        Self {
            machine,
            catalog,
            ledger,
            recorded: None,
            last_outcome: None,
        }
    }

    /// Swaps in another machine, for example one with a fixed seed.
    #[must_use]
    pub fn with_machine(mut self, machine: M) -> Self {
        self.machine = machine;
        self.recorded = None;
        self.last_outcome = None;
        self
    }

    #[must_use]
    pub fn machine(&self) -> &M {
        &self.machine
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog<M::Params> {
        &self.catalog
    }

    #[must_use]
    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    /// Ledger changes caused by the most recently finished round.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&RecordOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn open_level_select(&mut self) {
        self.machine.open_level_select();
    }

    pub fn select_category(&mut self, category: Option<CategoryId>) {
        self.machine.select_category(category);
    }

    /// Starts `level` if it exists and is unlocked. Returns whether a round
    /// began.
    pub fn select_level(&mut self, level: LevelId) -> bool {
        let Some(snapshot) = self.catalog.level(level) else {
            tracing::debug!(level = %level, "unknown level");
            return false;
        };
        if !self.ledger.is_unlocked(level) {
            tracing::debug!(level = %level, "level is locked");
            return false;
        }
        let phase = self.machine.phase();
        if !(phase == Phase::LevelSelect || phase.is_terminal()) {
            tracing::debug!(?phase, "ignored intent: select_level");
            return false;
        }
        self.machine.start(snapshot);
        self.last_outcome = None;
        true
    }

    /// Moves round time forward and records the result if the round ended.
    pub async fn advance(&mut self, dt: Duration) {
        self.machine.advance(dt);
        self.sync().await;
    }

    pub async fn skip(&mut self) {
        self.machine.skip();
        self.sync().await;
    }

    pub fn use_hint(&mut self) {
        self.machine.use_hint();
    }

    pub fn pause(&mut self) {
        self.machine.pause();
    }

    pub fn resume(&mut self) {
        self.machine.resume();
    }

    pub fn retry(&mut self) {
        if self.machine.phase().is_terminal() {
            self.last_outcome = None;
        }
        self.machine.retry();
    }

    /// Starts the level after the current one in its category, when the
    /// round is over and that level is unlocked.
    pub fn next_level(&mut self) -> Option<LevelId> {
        if !self.machine.phase().is_terminal() {
            tracing::debug!(phase = ?self.machine.phase(), "ignored intent: next_level");
            return None;
        }
        let current = self.machine.level()?.id();
        let next = self.catalog.successor(current)?;
        if !self.ledger.is_unlocked(next.id()) {
            tracing::debug!(level = %next.id(), "next level is locked");
            return None;
        }
        self.last_outcome = None;
        self.machine.start(next);
        Some(next.id())
    }

    pub fn reset_to_menu(&mut self) {
        self.machine.reset_to_menu();
        self.last_outcome = None;
    }

    /// Records a terminal result once.
    async fn sync(&mut self) {
        let Some(result) = self.machine.result() else {
            return;
        };
        if self.recorded == Some(result.round_id()) {
            return;
        }
        let result = result.clone();
        self.recorded = Some(result.round_id());
        let outcome = self.ledger.record(result.level(), &result).await;
        self.last_outcome = Some(outcome);
    }
}

//
// ─── TRIVIA ────────────────────────────────────────────────────────────────────
//

impl GameSession<TriviaRound> {
    /// Trivia session over the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the catalog or progression rules are invalid.
    pub async fn trivia(storage: &Storage, clock: Clock) -> Result<Self, SessionError> {
        let catalog = trivia_catalog()?;
        let rules = ProgressionRules::trivia();
        rules.validate()?;
        let ledger = ProgressLedger::load(TRIVIA_PROGRESS_KEY, rules, catalog.gates(), storage.kv.clone())
            .await
            .with_clock(clock);
        Ok(Self::new(TriviaRound::new(), catalog, ledger))
    }

    #[must_use]
    pub fn snapshot(&self) -> TriviaSnapshot {
        self.machine.snapshot()
    }

    pub async fn answer(&mut self, option_id: &str) {
        self.machine.answer(option_id);
        self.sync().await;
    }

    pub fn next_question(&mut self) {
        self.machine.next_question();
    }
}

//
// ─── MEMORY ────────────────────────────────────────────────────────────────────
//

impl GameSession<MemoryRound> {
    /// Pattern memory session over the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the catalog or progression rules are invalid.
    pub async fn memory(storage: &Storage, clock: Clock) -> Result<Self, SessionError> {
        let catalog = memory_catalog()?;
        let rules = ProgressionRules::memory();
        rules.validate()?;
        let ledger = ProgressLedger::load(MEMORY_PROGRESS_KEY, rules, catalog.gates(), storage.kv.clone())
            .await
            .with_clock(clock);
        Ok(Self::new(MemoryRound::new(), catalog, ledger))
    }

    #[must_use]
    pub fn snapshot(&self) -> MemorySnapshot {
        self.machine.snapshot()
    }

    pub async fn tap(&mut self, cell: CellIndex) {
        self.machine.tap(cell);
        self.sync().await;
    }
}
