//! Durable per-level progress, unlock gating and rank for one game.
//!
//! The ledger keeps the whole document in memory and writes it back after
//! every recorded round. Reads never touch the store. Storage trouble is
//! logged and otherwise ignored so a broken backend never blocks play.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arcade_core::Clock;
use arcade_core::model::{AggregateStats, CategoryId, LevelGate, LevelId, LevelProgress, RoundResult};
use arcade_core::rules::{ProgressionRules, RankBracket};
use storage::repository::KeyValueStore;

use crate::error::LedgerError;

pub const TRIVIA_PROGRESS_KEY: &str = "critter-arcade.trivia.progress";
pub const MEMORY_PROGRESS_KEY: &str = "critter-arcade.memory.progress";

const DOCUMENT_VERSION: u32 = 1;

//
// ─── DOCUMENT ──────────────────────────────────────────────────────────────────
//

/// Persisted shape of one game's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProgressDocument {
    version: u32,
    #[serde(default)]
    levels: BTreeMap<LevelId, LevelProgress>,
    #[serde(default)]
    stats: AggregateStats,
}

impl Default for ProgressDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            levels: BTreeMap::new(),
            stats: AggregateStats::default(),
        }
    }
}

/// What changed when a round was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub recorded_at: DateTime<Utc>,
    /// Stars gained on the recorded level.
    pub new_stars: u8,
    pub newly_unlocked: Vec<LevelId>,
    pub rank_changed: bool,
}

//
// ─── LEDGER ────────────────────────────────────────────────────────────────────
//

pub struct ProgressLedger {
    key: String,
    rules: ProgressionRules,
    gates: Vec<LevelGate>,
    store: Arc<dyn KeyValueStore>,
    clock: Clock,
    doc: ProgressDocument,
}

impl std::fmt::Debug for ProgressLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressLedger")
            .field("key", &self.key)
            .field("levels", &self.doc.levels.len())
            .field("rank", &self.doc.stats.rank)
            .finish_non_exhaustive()
    }
}

impl ProgressLedger {
    /// Reads the stored document for `key`.
    ///
    /// Missing, unreadable, malformed or outdated documents all start from
    /// empty progress.
    pub async fn load(
        key: impl Into<String>,
        rules: ProgressionRules,
        gates: Vec<LevelGate>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let key = key.into();
        let doc = match store.load(&key).await {
            Ok(Some(bytes)) => decode(&key, &bytes),
            Ok(None) => {
                tracing::debug!(key = %key, "no stored progress");
                ProgressDocument::default()
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "progress could not be read; starting fresh");
                ProgressDocument::default()
            }
        };
        Self {
            key,
            rules,
            gates,
            store,
            clock: Clock::default(),
            doc,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn rules(&self) -> &ProgressionRules {
        &self.rules
    }

    /// Folds a finished round into the ledger and writes it back.
    pub async fn record(&mut self, level: LevelId, result: &RoundResult) -> RecordOutcome {
        let now = self.clock.now();
        let new_stars = self
            .doc
            .levels
            .entry(level)
            .or_default()
            .absorb(result, &self.rules, now);
        let rank_changed = self.doc.stats.absorb(result, &self.rules);

        let mut newly_unlocked = Vec::new();
        for gate in &self.gates {
            let Some(requirement) = gate.unlock.filter(|r| r.level == level) else {
                continue;
            };
            if !requirement.is_met_by(result.score(), result.accuracy()) {
                continue;
            }
            let progress = self.doc.levels.entry(gate.id).or_default();
            if !progress.unlocked {
                progress.unlocked = true;
                newly_unlocked.push(gate.id);
                tracing::info!(level = %gate.id, after = %level, "level unlocked");
            }
        }
        if rank_changed {
            tracing::info!(rank = ?self.rank().map(|r| &r.title), "rank advanced");
        }

        if let Err(err) = self.persist().await {
            tracing::warn!(key = %self.key, error = %err, "progress could not be saved");
        }

        RecordOutcome {
            recorded_at: now,
            new_stars,
            newly_unlocked,
            rank_changed,
        }
    }

    /// Stored progress for `level`, with `unlocked` reflecting the gate.
    #[must_use]
    pub fn progress_of(&self, level: LevelId) -> LevelProgress {
        let mut progress = self.doc.levels.get(&level).cloned().unwrap_or_default();
        progress.unlocked = self.is_unlocked(level);
        progress
    }

    /// Entry levels are always open. Others open once recorded as unlocked or
    /// once the prerequisite's best figures meet the requirement. Levels the
    /// catalog does not know are locked.
    #[must_use]
    pub fn is_unlocked(&self, level: LevelId) -> bool {
        let Some(gate) = self.gates.iter().find(|g| g.id == level) else {
            return false;
        };
        let Some(requirement) = gate.unlock else {
            return true;
        };
        if self.doc.levels.get(&level).is_some_and(|p| p.unlocked) {
            return true;
        }
        self.doc
            .levels
            .get(&requirement.level)
            .is_some_and(|p| requirement.is_met_by(p.high_score, p.best_accuracy))
    }

    #[must_use]
    pub fn total_stars(&self) -> u32 {
        self.stars_where(|_| true)
    }

    #[must_use]
    pub fn category_stars(&self, category: CategoryId) -> u32 {
        self.stars_where(|gate| gate.category == category)
    }

    fn stars_where(&self, keep: impl Fn(&LevelGate) -> bool) -> u32 {
        self.gates
            .iter()
            .filter(|gate| keep(gate))
            .filter_map(|gate| self.doc.levels.get(&gate.id))
            .map(|p| u32::from(p.stars))
            .sum()
    }

    /// Current rank bracket.
    #[must_use]
    pub fn rank(&self) -> Option<&RankBracket> {
        self.rules.ranks.get(self.doc.stats.rank)
    }

    /// The bracket after the current one, if any.
    #[must_use]
    pub fn next_rank(&self) -> Option<&RankBracket> {
        self.rules.ranks.get(self.doc.stats.rank + 1)
    }

    #[must_use]
    pub fn stats(&self) -> &AggregateStats {
        &self.doc.stats
    }

    /// Writes the in-memory document to the store.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if encoding or the write fails.
    pub async fn persist(&self) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec(&self.doc)?;
        self.store.save(&self.key, &bytes).await?;
        tracing::debug!(key = %self.key, bytes = bytes.len(), "progress saved");
        Ok(())
    }
}

fn decode(key: &str, bytes: &[u8]) -> ProgressDocument {
    match serde_json::from_slice::<ProgressDocument>(bytes) {
        Ok(doc) if doc.version == DOCUMENT_VERSION => doc,
        Ok(doc) => {
            tracing::warn!(
                key,
                found = doc.version,
                expected = DOCUMENT_VERSION,
                "unsupported progress version; starting fresh"
            );
            ProgressDocument::default()
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "progress is malformed; starting fresh");
            ProgressDocument::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::model::{
        DifficultyTier, ItemOutcome, RoundOutcome, RoundTally, UnlockRequirement,
    };
    use arcade_core::rules::ScoringRules;
    use arcade_core::time::fixed_clock;
    use std::time::Duration;
    use storage::repository::InMemoryStore;

    const CAT: CategoryId = CategoryId::new("mammals");

    fn gates() -> Vec<LevelGate> {
        vec![
            LevelGate {
                id: LevelId::new(3),
                category: CAT,
                unlock: None,
            },
            LevelGate {
                id: LevelId::new(4),
                category: CAT,
                unlock: Some(UnlockRequirement::score(LevelId::new(3), 700)),
            },
            LevelGate {
                id: LevelId::new(5),
                category: CategoryId::new("birds"),
                unlock: Some(UnlockRequirement::score(LevelId::new(4), 1).with_min_accuracy(90.0)),
            },
        ]
    }

    fn result(level: u32, correct: u32, wrong: u32) -> RoundResult {
        let rules = ScoringRules::trivia();
        let mut tally = RoundTally::new();
        for _ in 0..correct {
            tally.record(&rules, DifficultyTier::Easy, ItemOutcome::Correct, Duration::from_secs(3), false);
        }
        for _ in 0..wrong {
            tally.record(&rules, DifficultyTier::Easy, ItemOutcome::Wrong, Duration::from_secs(3), false);
        }
        tally.finish(&rules, LevelId::new(level), RoundOutcome::Completed)
    }

    async fn ledger_with(store: Arc<dyn KeyValueStore>) -> ProgressLedger {
        ProgressLedger::load(TRIVIA_PROGRESS_KEY, ProgressionRules::trivia(), gates(), store)
            .await
            .with_clock(fixed_clock())
    }

    async fn seeded(high_score: u32) -> ProgressLedger {
        let store = InMemoryStore::new();
        let doc = serde_json::json!({
            "version": 1,
            "levels": { "3": { "high_score": high_score } },
        });
        store
            .save(TRIVIA_PROGRESS_KEY, &serde_json::to_vec(&doc).unwrap())
            .await
            .unwrap();
        ledger_with(Arc::new(store)).await
    }

    #[tokio::test]
    async fn unlock_follows_prerequisite_high_score() {
        assert!(!seeded(699).await.is_unlocked(LevelId::new(4)));
        assert!(seeded(700).await.is_unlocked(LevelId::new(4)));
        assert!(seeded(0).await.is_unlocked(LevelId::new(3)));
    }

    #[tokio::test]
    async fn unknown_levels_are_locked() {
        let ledger = ledger_with(Arc::new(InMemoryStore::new())).await;
        assert!(!ledger.is_unlocked(LevelId::new(99)));
        assert!(ledger.progress_of(LevelId::new(3)).unlocked);
        assert!(!ledger.progress_of(LevelId::new(4)).unlocked);
    }

    #[tokio::test]
    async fn record_unlocks_dependents_and_persists() {
        let store = Arc::new(InMemoryStore::new());
        let mut ledger = ledger_with(store.clone()).await;
        let good = result(3, 8, 0);
        assert!(good.score() >= 700);

        let outcome = ledger.record(LevelId::new(3), &good).await;
        assert_eq!(outcome.newly_unlocked, vec![LevelId::new(4)]);
        assert_eq!(outcome.new_stars, 3);
        assert_eq!(outcome.recorded_at, arcade_core::time::fixed_now());

        let reloaded = ledger_with(store).await;
        assert!(reloaded.is_unlocked(LevelId::new(4)));
        assert_eq!(reloaded.progress_of(LevelId::new(3)).plays, 1);
        assert_eq!(reloaded.total_stars(), 3);
        assert_eq!(reloaded.category_stars(CategoryId::new("birds")), 0);
    }

    #[tokio::test]
    async fn accuracy_gate_blocks_sloppy_rounds() {
        let mut ledger = ledger_with(Arc::new(InMemoryStore::new())).await;
        let outcome = ledger.record(LevelId::new(4), &result(4, 5, 5)).await;
        assert!(outcome.newly_unlocked.is_empty());
        assert!(!ledger.is_unlocked(LevelId::new(5)));
    }

    #[tokio::test]
    async fn unlocks_and_bests_never_regress() {
        let mut ledger = ledger_with(Arc::new(InMemoryStore::new())).await;
        ledger.record(LevelId::new(3), &result(3, 8, 0)).await;
        let best = ledger.progress_of(LevelId::new(3));

        let outcome = ledger.record(LevelId::new(3), &result(3, 1, 7)).await;
        assert_eq!(outcome.new_stars, 0);
        assert!(outcome.newly_unlocked.is_empty());
        let after = ledger.progress_of(LevelId::new(3));
        assert_eq!(after.high_score, best.high_score);
        assert_eq!(after.stars, best.stars);
        assert!(after.best_accuracy >= best.best_accuracy);
        assert_eq!(after.plays, 2);
        assert!(ledger.is_unlocked(LevelId::new(4)));
    }

    #[tokio::test]
    async fn garbage_and_stale_versions_start_fresh() {
        let store = InMemoryStore::new();
        store.save(TRIVIA_PROGRESS_KEY, b"{not json").await.unwrap();
        let ledger = ledger_with(Arc::new(store.clone())).await;
        assert_eq!(ledger.stats().rounds_played, 0);

        store
            .save(TRIVIA_PROGRESS_KEY, br#"{"version":0,"stats":{"rounds_played":9}}"#)
            .await
            .unwrap();
        let ledger = ledger_with(Arc::new(store)).await;
        assert_eq!(ledger.stats().rounds_played, 0);
    }

    #[tokio::test]
    async fn rank_starts_at_first_bracket() {
        let ledger = ledger_with(Arc::new(InMemoryStore::new())).await;
        assert_eq!(ledger.rank().map(|r| r.title.as_str()), Some("Hatchling"));
        assert_eq!(ledger.next_rank().map(|r| r.min_count), Some(5));
    }
}
