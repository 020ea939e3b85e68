//! Scores, streaks, and one-shot achievement latches. This state is
//! mutated from the click handler, the speech handler, and the turn
//! machine, so it lives in one struct passed by reference into each.

use crate::config::Difficulty;

/// Threshold-triggered notifications. Streak achievements fire on the
/// click channel; growth achievements latch and fire exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    StreakFive,
    StreakTen,
    /// Every plant reached maximum growth.
    Mastery,
    /// Every plant shrank to minimum growth.
    Wilted,
}

impl Achievement {
    pub fn message(self) -> &'static str {
        match self {
            Achievement::StreakFive => "5 in a row! Keep going!",
            Achievement::StreakTen => "10 in a row! Incredible!",
            Achievement::Mastery => "The garden is in full bloom!",
            Achievement::Wilted => "The garden has wilted...",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ScoreBoard {
    pub interaction_points: u32,
    pub speech_points: u32,
    pub interaction_streak: u32,
    pub speech_streak: u32,
    mastery_fired: bool,
    wilted_fired: bool,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click-channel outcome. Returns the streak achievement
    /// crossed this answer, if any.
    pub fn record_interaction(&mut self, correct: bool, penalty: bool) -> Option<Achievement> {
        if correct {
            self.interaction_points += 1;
            self.interaction_streak += 1;
            match self.interaction_streak {
                5 => Some(Achievement::StreakFive),
                10 => Some(Achievement::StreakTen),
                _ => None,
            }
        } else {
            if penalty {
                self.interaction_points = self.interaction_points.saturating_sub(1);
            }
            self.interaction_streak = 0;
            None
        }
    }

    /// Record a speech-channel outcome. Never touches the click streak.
    pub fn record_speech(&mut self, correct: bool, penalty: bool) {
        if correct {
            self.speech_points += 1;
            self.speech_streak += 1;
        } else {
            if penalty {
                self.speech_points = self.speech_points.saturating_sub(1);
            }
            self.speech_streak = 0;
        }
    }

    /// Credit the speech channel without an actual spoken answer (used
    /// when speech mode is off and a correct click auto-credits it).
    pub fn credit_speech(&mut self) {
        self.speech_points += 1;
    }

    pub fn debit_speech(&mut self) {
        self.speech_points = self.speech_points.saturating_sub(1);
    }

    /// One-shot: true the first time all plants are at maximum growth.
    pub fn latch_mastery(&mut self) -> bool {
        if self.mastery_fired {
            return false;
        }
        self.mastery_fired = true;
        true
    }

    /// One-shot: true the first time all plants are at minimum growth.
    pub fn latch_wilted(&mut self) -> bool {
        if self.wilted_fired {
            return false;
        }
        self.wilted_fired = true;
        true
    }

    /// Win requires both channels to reach their goals, independently.
    pub fn has_won(&self, difficulty: &Difficulty) -> bool {
        self.interaction_points >= difficulty.interaction_goal
            && self.speech_points >= difficulty.speech_goal
    }

    pub fn reset(&mut self) {
        *self = ScoreBoard::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_floor_at_zero() {
        let mut s = ScoreBoard::new();
        for _ in 0..5 {
            let _ = s.record_interaction(false, true);
        }
        assert_eq!(s.interaction_points, 0);
    }

    #[test]
    fn streak_resets_on_single_miss() {
        let mut s = ScoreBoard::new();
        for _ in 0..7 {
            let _ = s.record_interaction(true, true);
        }
        assert_eq!(s.interaction_streak, 7);
        let _ = s.record_interaction(false, true);
        assert_eq!(s.interaction_streak, 0);
        let _ = s.record_interaction(true, true);
        assert_eq!(s.interaction_streak, 1);
    }

    #[test]
    fn streak_achievements_fire_at_thresholds() {
        let mut s = ScoreBoard::new();
        let mut fired = Vec::new();
        for _ in 0..10 {
            if let Some(a) = s.record_interaction(true, true) {
                fired.push(a);
            }
        }
        assert_eq!(fired, vec![Achievement::StreakFive, Achievement::StreakTen]);
    }

    #[test]
    fn win_is_a_conjunction() {
        let d = Difficulty::EASY; // goals 5 / 3
        let mut s = ScoreBoard::new();
        s.interaction_points = 5;
        assert!(!s.has_won(&d));
        s.speech_points = 3;
        assert!(s.has_won(&d));
        s.interaction_points = 4;
        assert!(!s.has_won(&d));
    }

    #[test]
    fn latches_fire_once() {
        let mut s = ScoreBoard::new();
        assert!(s.latch_mastery());
        assert!(!s.latch_mastery());
        assert!(s.latch_wilted());
        assert!(!s.latch_wilted());
        s.reset();
        assert!(s.latch_mastery());
    }

    #[test]
    fn speech_streak_independent_of_click_streak() {
        let mut s = ScoreBoard::new();
        let _ = s.record_interaction(true, true);
        s.record_speech(false, true);
        assert_eq!(s.interaction_streak, 1);
        assert_eq!(s.speech_streak, 0);
    }
}
