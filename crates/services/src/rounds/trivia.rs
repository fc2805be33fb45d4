use std::time::Duration;

use arcade_core::model::{
    CategoryId, DifficultyTier, ItemOutcome, Level, Question, QuestionKind, RoundOutcome, RoundResult,
    TriviaLevel, TriviaParams,
};
use arcade_core::rules::{RoundTiming, RulesError, ScoringRules};
use arcade_core::timer::TimerHandle;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Phase, RoundCore, RoundMachine, RoundStatus};
use crate::generator::generate_questions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriviaEvent {
    CountdownTick,
    QuestionTimeout,
    FeedbackElapsed,
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// A question as the player sees it: no correctness flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub kind: QuestionKind,
    pub prompt: String,
    /// `(id, label)` in display order.
    pub options: Vec<(String, String)>,
}

/// What the player learns once a question is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    /// `None` when the question was skipped or timed out.
    pub chosen: Option<String>,
    pub correct: bool,
    pub correct_option: String,
    pub explanation: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriviaSnapshot {
    pub status: RoundStatus,
    pub question: Option<QuestionView>,
    pub hint: Option<String>,
    pub feedback: Option<AnswerFeedback>,
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// Animal trivia round.
///
/// After an answer the question stays on screen with its feedback until
/// `next_question` or the feedback delay elapses; the last answer ends the
/// round straight away.
#[derive(Debug)]
pub struct TriviaRound {
    core: RoundCore<TriviaParams, TriviaEvent>,
    rng: StdRng,
    questions: Vec<Question>,
    current: usize,
    presented: bool,
    feedback: Option<AnswerFeedback>,
    hint_shown: bool,
    question_started: Duration,
    question_timer: Option<TimerHandle>,
    feedback_timer: Option<TimerHandle>,
}

impl Default for TriviaRound {
    fn default() -> Self {
        Self::new()
    }
}

impl TriviaRound {
    /// Round seeded from the OS random source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Round with reproducible content.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            core: RoundCore::new(ScoringRules::trivia(), RoundTiming::default()),
            rng,
            questions: Vec::new(),
            current: 0,
            presented: false,
            feedback: None,
            hint_shown: false,
            question_started: Duration::ZERO,
            question_timer: None,
            feedback_timer: None,
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
    pub fn snapshot(&self) -> TriviaSnapshot {
        let question = self.presented_question();
        TriviaSnapshot {
            status: self.status(),
            question: question.map(|q| QuestionView {
                index: self.current,
                total: self.questions.len(),
                kind: q.kind,
                prompt: q.prompt.clone(),
                options: q
                    .options
                    .iter()
                    .map(|o| (o.id.clone(), o.label.clone()))
                    .collect(),
            }),
            hint: question
                .filter(|_| self.hint_shown)
                .and_then(|q| q.hint.clone()),
            feedback: self.feedback.clone(),
        }
    }

    /// The question on screen, including its answer key.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.presented_question()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Submits an answer for the current question. Ignored outside active
    /// play, for unknown ids, and once the question has been answered.
    pub fn answer(&mut self, option_id: &str) {
        if self.core.phase != Phase::Active || self.feedback.is_some() {
            self.core.ignore("answer");
            return;
        }
        let Some(option) = self.presented_question().and_then(|q| q.option(option_id)) else {
            tracing::debug!(option_id, "unknown answer option");
            return;
        };
        let outcome = if option.is_correct {
            ItemOutcome::Correct
        } else {
            ItemOutcome::Wrong
        };
        self.resolve(outcome, Some(option_id.to_owned()));
    }

    /// Leaves the feedback view early.
    pub fn next_question(&mut self) {
        if self.core.phase != Phase::Active || self.feedback.is_none() {
            self.core.ignore("next_question");
            return;
        }
        if let Some(handle) = self.feedback_timer.take() {
            self.core.timers.cancel(handle);
        }
        self.present(self.current + 1);
    }

    fn presented_question(&self) -> Option<&Question> {
        if self.presented {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    fn tier(&self) -> DifficultyTier {
        self.core
            .level
            .as_ref()
            .map_or(DifficultyTier::Easy, Level::tier)
    }

    fn present(&mut self, index: usize) {
        let Some(limit) = self.core.level.as_ref().map(|l| l.params().time_limit) else {
            return;
        };
        self.current = index;
        self.presented = true;
        self.feedback = None;
        self.hint_shown = false;
        self.question_started = self.core.timers.now();
        self.question_timer = Some(
            self.core
                .timers
                .after(limit, TriviaEvent::QuestionTimeout),
        );
    }

    fn resolve(&mut self, outcome: ItemOutcome, chosen: Option<String>) {
        if let Some(handle) = self.question_timer.take() {
            self.core.timers.cancel(handle);
        }
        let tier = self.tier();
        let elapsed = self.core.elapsed_since(self.question_started);
        let Some(question) = self.questions.get(self.current) else {
            return;
        };

        let points = self
            .core
            .tally
            .record(&self.core.rules, tier, outcome, elapsed, self.hint_shown)
            .points;
        if outcome == ItemOutcome::Correct {
            self.core.tally.learn(question.subject);
        }
        self.feedback = Some(AnswerFeedback {
            chosen,
            correct: outcome == ItemOutcome::Correct,
            correct_option: question
                .correct_option()
                .map(|o| o.id.clone())
                .unwrap_or_default(),
            explanation: question.explanation.clone(),
            points,
        });

        if self.current + 1 >= self.questions.len() {
            self.core.finish(RoundOutcome::Completed);
        } else {
            let delay = self.core.timing.feedback_delay;
            self.feedback_timer = Some(self.core.timers.after(delay, TriviaEvent::FeedbackElapsed));
        }
    }

    fn on_timer(&mut self, event: TriviaEvent) {
        match event {
            TriviaEvent::CountdownTick => {
                if self.core.countdown_tick(TriviaEvent::CountdownTick) {
                    self.core.enter(Phase::Active);
                    if self.questions.is_empty() {
                        self.core.finish(RoundOutcome::Completed);
                    } else {
                        self.present(0);
                    }
                }
            }
            TriviaEvent::QuestionTimeout => {
                self.question_timer = None;
                if self.feedback.is_none() {
                    tracing::debug!(question = self.current, "question timed out");
                    self.resolve(ItemOutcome::Skipped, None);
                }
            }
            TriviaEvent::FeedbackElapsed => {
                self.feedback_timer = None;
                self.present(self.current + 1);
            }
        }
    }
}

impl RoundMachine for TriviaRound {
    type Params = TriviaParams;

    fn status(&self) -> RoundStatus {
        let remaining = self
            .question_timer
            .and_then(|handle| self.core.timers.remaining(handle));
        self.core.status(remaining)
    }

    fn phase(&self) -> Phase {
        self.core.phase
    }

    fn result(&self) -> Option<&RoundResult> {
        self.core.result.as_ref()
    }

    fn level(&self) -> Option<&TriviaLevel> {
        self.core.level.as_ref()
    }

    fn open_level_select(&mut self) {
        self.core.open_level_select();
    }

    fn select_category(&mut self, category: Option<CategoryId>) {
        self.core.select_category(category);
    }

    fn start(&mut self, level: &TriviaLevel) {
        if !self.core.begin(level, TriviaEvent::CountdownTick) {
            return;
        }
        self.questions = generate_questions(level, &mut self.rng);
        self.current = 0;
        self.presented = false;
        self.feedback = None;
        self.hint_shown = false;
        self.question_timer = None;
        self.feedback_timer = None;
    }

    fn use_hint(&mut self) {
        let available = self
            .presented_question()
            .is_some_and(|q| q.hint.is_some());
        if self.core.phase == Phase::Active && self.feedback.is_none() && available && !self.hint_shown {
            self.hint_shown = true;
        } else {
            self.core.ignore("use_hint");
        }
    }

    fn skip(&mut self) {
        if self.core.phase == Phase::Active && self.feedback.is_none() && self.presented {
            self.resolve(ItemOutcome::Skipped, None);
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
        self.questions.clear();
        self.current = 0;
        self.presented = false;
        self.feedback = None;
        self.hint_shown = false;
        self.question_timer = None;
        self.feedback_timer = None;
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
    use arcade_core::catalog::animals::BIRDS;
    use arcade_core::model::LevelId;

    fn level(count: u32) -> TriviaLevel {
        Level::new(
            LevelId::new(4),
            "Birds",
            "",
            BIRDS,
            DifficultyTier::Easy,
            None,
            TriviaParams {
                question_count: count,
                allowed_kinds: QuestionKind::ALL.to_vec(),
                time_limit: Duration::from_secs(10),
                option_count: 4,
            },
        )
        .unwrap()
    }

    fn started(count: u32) -> TriviaRound {
        let mut round = TriviaRound::with_seed(17);
        round.open_level_select();
        round.start(&level(count));
        round.advance(Duration::from_secs(3));
        assert_eq!(round.phase(), Phase::Active);
        round
    }

    fn correct_id(round: &TriviaRound) -> String {
        round
            .current_question()
            .and_then(Question::correct_option)
            .map(|o| o.id.clone())
            .unwrap()
    }

    fn wrong_id(round: &TriviaRound) -> String {
        round
            .current_question()
            .and_then(|q| q.options.iter().find(|o| !o.is_correct))
            .map(|o| o.id.clone())
            .unwrap()
    }

    #[test]
    fn countdown_runs_before_play() {
        let mut round = TriviaRound::with_seed(1);
        round.open_level_select();
        round.start(&level(3));
        assert_eq!(round.phase(), Phase::Countdown);
        assert_eq!(round.status().countdown, 3);
        assert!(round.snapshot().question.is_none());

        round.advance(Duration::from_secs(2));
        assert_eq!(round.status().countdown, 1);
        round.advance(Duration::from_secs(1));
        assert_eq!(round.phase(), Phase::Active);
        assert_eq!(round.snapshot().question.unwrap().index, 0);
        assert_eq!(round.status().time_remaining, Some(Duration::from_secs(10)));
    }

    #[test]
    fn start_is_ignored_from_menu() {
        let mut round = TriviaRound::with_seed(1);
        round.start(&level(3));
        assert_eq!(round.phase(), Phase::Menu);
    }

    #[test]
    fn second_answer_is_a_no_op() {
        let mut round = started(3);
        let correct = correct_id(&round);
        let wrong = wrong_id(&round);
        round.answer(&correct);
        let score = round.status().score;
        round.answer(&wrong);
        assert_eq!(round.status().score, score);
        assert!(round.snapshot().feedback.unwrap().correct);
        assert_eq!(round.status().combo.current, 1);
    }

    #[test]
    fn feedback_delay_moves_to_next_question() {
        let mut round = started(3);
        let correct = correct_id(&round);
        round.answer(&correct);
        round.advance(Duration::from_millis(1_499));
        assert_eq!(round.snapshot().question.unwrap().index, 0);
        round.advance(Duration::from_millis(1));
        let snapshot = round.snapshot();
        assert_eq!(snapshot.question.unwrap().index, 1);
        assert!(snapshot.feedback.is_none());
    }

    #[test]
    fn next_question_skips_the_feedback_wait() {
        let mut round = started(3);
        round.next_question();
        assert_eq!(round.snapshot().question.unwrap().index, 0);
        let correct = correct_id(&round);
        round.answer(&correct);
        round.next_question();
        assert_eq!(round.snapshot().question.unwrap().index, 1);
    }

    #[test]
    fn timeout_counts_as_skip_and_breaks_combo() {
        let mut round = started(3);
        let correct = correct_id(&round);
        round.answer(&correct);
        round.next_question();
        assert_eq!(round.status().combo.current, 1);

        round.advance(Duration::from_secs(10));
        let feedback = round.snapshot().feedback.unwrap();
        assert!(feedback.chosen.is_none());
        assert!(!feedback.correct);
        assert_eq!(round.status().combo.current, 0);
    }

    #[test]
    fn pause_keeps_question_time() {
        let mut round = started(3);
        round.advance(Duration::from_secs(4));
        round.pause();
        assert_eq!(round.phase(), Phase::Paused);

        round.advance(Duration::from_secs(60));
        round.answer(&correct_id(&round));
        assert!(round.snapshot().feedback.is_none());

        round.resume();
        assert_eq!(round.phase(), Phase::Active);
        assert_eq!(round.status().time_remaining, Some(Duration::from_secs(6)));
    }

    #[test]
    fn hint_is_idempotent_and_costs_points() {
        let mut round = started(2);
        round.use_hint();
        round.use_hint();
        assert!(round.snapshot().hint.is_some());
        round.answer(&correct_id(&round));
        let feedback = round.snapshot().feedback.unwrap();
        // 100 base + 50 time bonus (answered instantly) - 25 hint penalty
        assert_eq!(feedback.points, 125);
    }

    #[test]
    fn last_answer_finishes_round() {
        let mut round = started(2);
        round.answer(&correct_id(&round));
        round.next_question();
        round.answer(&wrong_id(&round));
        assert_eq!(round.phase(), Phase::Results);
        let result = round.result().unwrap();
        assert_eq!(result.correct(), 1);
        assert_eq!(result.wrong(), 1);
        assert_eq!(result.outcome(), RoundOutcome::Completed);
        assert_eq!(round.status().time_remaining, None);
    }

    #[test]
    fn retry_replays_same_level() {
        let mut round = started(1);
        round.skip();
        assert_eq!(round.phase(), Phase::Results);
        round.retry();
        assert_eq!(round.phase(), Phase::Countdown);
        assert!(round.result().is_none());
        assert_eq!(round.level().map(Level::id), Some(LevelId::new(4)));
    }

    #[test]
    fn reset_drops_pending_timers() {
        let mut round = started(3);
        round.reset_to_menu();
        assert_eq!(round.phase(), Phase::Menu);
        round.advance(Duration::from_secs(30));
        assert_eq!(round.phase(), Phase::Menu);
        assert!(round.snapshot().question.is_none());
        assert_eq!(round.status().score, 0);
    }
}
