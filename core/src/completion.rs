use serde::Serialize;

use crate::clock::SessionTimer;
use crate::config::ScoringRules;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CompletionEvent {
    pub elapsed_seconds: u64,
    pub final_score: u64,
    pub bonus: u64,
    pub awarded_points: u64,
}

impl CompletionEvent {
    pub fn compute(rules: &ScoringRules, elapsed_seconds: u64, score: u32) -> Self {
        let decay = u64::from(rules.bonus_decay_per_second).saturating_mul(elapsed_seconds);
        let bonus = u64::from(rules.base_bonus).saturating_sub(decay);
        let final_score = u64::from(score) + bonus;
        let awarded_points = final_score
            .checked_div(u64::from(rules.point_divisor))
            .unwrap_or(0);
        Self {
            elapsed_seconds,
            final_score,
            bonus,
            awarded_points,
        }
    }
}

/// Watches the partition size and reports the moment it reaches one group.
#[derive(Clone, Debug)]
pub struct CompletionDetector {
    rules: ScoringRules,
    event: Option<CompletionEvent>,
}

impl CompletionDetector {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules, event: None }
    }

    pub fn event(&self) -> Option<CompletionEvent> {
        self.event
    }

    /// Returns the event only on the call that first sees a single group.
    pub fn observe(
        &mut self,
        group_count: usize,
        timer: &mut SessionTimer,
        score: u32,
    ) -> Option<CompletionEvent> {
        if group_count != 1 || self.event.is_some() {
            return None;
        }
        timer.stop();
        let event = CompletionEvent::compute(&self.rules, timer.elapsed_seconds(), score);
        tracing::info!(
            elapsed_seconds = event.elapsed_seconds,
            final_score = event.final_score,
            bonus = event.bonus,
            awarded_points = event.awarded_points,
            "puzzle completed"
        );
        self.event = Some(event);
        Some(event)
    }
}
