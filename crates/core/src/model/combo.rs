use crate::rules::{BASE_MULTIPLIER, ScoringRules};
use crate::scoring::combo_multiplier;

/// Running streak of the active round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboState {
    pub current: u32,
    pub multiplier: f64,
    pub max_reached: u32,
    pub is_on_fire: bool,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            current: 0,
            multiplier: BASE_MULTIPLIER,
            max_reached: 0,
            is_on_fire: false,
        }
    }
}

impl ComboState {
    /// Extends the streak after a correct item.
    pub fn hit(&mut self, rules: &ScoringRules) {
        self.current = self.current.saturating_add(1);
        self.multiplier = combo_multiplier(rules, self.current);
        self.max_reached = self.max_reached.max(self.current);
        self.is_on_fire = self.current >= rules.on_fire_streak;
    }

    /// Breaks the streak after a wrong or skipped item. `max_reached` survives.
    pub fn miss(&mut self) {
        self.current = 0;
        self.multiplier = BASE_MULTIPLIER;
        self.is_on_fire = false;
    }
}
