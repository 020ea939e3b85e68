use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Simulation area in pixels.
pub const SCREEN_WIDTH: f32 = 1024.0;
pub const SCREEN_HEIGHT: f32 = 768.0;
/// Fish swim between the top of the screen and this line; below it is sand.
pub const SWIM_DEPTH: f32 = 576.0;

/// Plants grow in a band this tall above the bottom edge.
pub const SAND_BAND: f32 = 190.0;
/// Minimum spacing between planted stems.
pub const PLANT_SPACING: f32 = 100.0;

/// Shared plant growth bounds and per-answer step.
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 2.0;
pub const SCALE_INCREMENT: f32 = 0.1;
pub const START_SCALE: f32 = 1.0;

/// Fish banks per scene and members per bank.
pub const BANK_COUNT: usize = 3;
pub const BANK_SIZE: usize = 5;
/// Minimum spacing between bank centers / between members of one bank.
pub const BANK_SPACING: f32 = 100.0;
pub const BANK_MEMBER_SPACING: f32 = 45.0;

/// Simulation ticks per second.
pub const TICKS_PER_SECOND: u64 = 60;

/// Physics stays suspended on a clicked fish for this long (~300 ms).
pub const DISABLE_COOLDOWN_TICKS: u64 = 18;
/// Further pointer input is ignored for this long after a click (500 ms).
pub const CLICK_COOLDOWN_TICKS: u64 = 30;
/// Countdown before the answer window opens: 5 steps of 1 s each.
pub const COUNTDOWN_STEPS: u8 = 5;
pub const COUNTDOWN_STEP_TICKS: u64 = 60;
/// Turn announcement banner duration (1.5 s).
pub const ANNOUNCE_TICKS: u64 = 90;
/// Delay between announcing a turn and showing the question (2 s).
pub const ASK_DELAY_TICKS: u64 = 120;
/// Celebration length before the session restarts (10 s).
pub const CELEBRATION_TICKS: u64 = 600;

/// Per-session population and goal parameters. Immutable once a session
/// starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub fish_count: usize,
    pub plant_count: usize,
    pub fish_base_speed: f32,
    /// Points needed on the click channel to win.
    pub interaction_goal: u32,
    /// Points needed on the speech channel to win.
    pub speech_goal: u32,
    /// Plant sway period range in seconds.
    pub sway_period: (f32, f32),
}

impl Difficulty {
    pub const EASY: Difficulty = Difficulty {
        fish_count: 5,
        plant_count: 3,
        fish_base_speed: 25.0,
        interaction_goal: 5,
        speech_goal: 3,
        sway_period: (2.0, 3.0),
    };

    pub const MEDIUM: Difficulty = Difficulty {
        fish_count: 10,
        plant_count: 5,
        fish_base_speed: 30.0,
        interaction_goal: 10,
        speech_goal: 5,
        sway_period: (1.5, 2.5),
    };

    pub const HARD: Difficulty = Difficulty {
        fish_count: 15,
        plant_count: 8,
        fish_base_speed: 35.0,
        interaction_goal: 15,
        speech_goal: 8,
        sway_period: (1.0, 2.0),
    };

    pub fn by_name(name: &str) -> Option<Difficulty> {
        match name.to_lowercase().as_str() {
            "easy" => Some(Difficulty::EASY),
            "medium" | "med" => Some(Difficulty::MEDIUM),
            "hard" => Some(Difficulty::HARD),
            _ => None,
        }
    }

    /// Load a host-supplied override, e.g. from a settings file.
    pub fn from_json(json: &str) -> Result<Difficulty> {
        let d: Difficulty = serde_json::from_str(json)?;
        d.validate()?;
        Ok(d)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fish_count == 0 || self.plant_count == 0 {
            return Err(SessionError::InvalidConfig(
                "fish_count and plant_count must be positive".into(),
            ));
        }
        if !self.fish_base_speed.is_finite() || self.fish_base_speed < 0.0 {
            return Err(SessionError::InvalidConfig(format!(
                "bad fish_base_speed: {}",
                self.fish_base_speed
            )));
        }
        if self.interaction_goal == 0 || self.speech_goal == 0 {
            return Err(SessionError::InvalidConfig(
                "score goals must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::MEDIUM
    }
}

/// Solo practice or teacher-led classroom turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionMode {
    #[default]
    Solo,
    Classroom,
}

/// Session toggles. The scoring variants observed in the wild are both
/// supported: `penalty_on_wrong` and `auto_credit_speech` default to the
/// symmetric-penalty, speech-auto-credit behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub mode: SessionMode,
    /// Accept spoken answers during the answer window.
    pub speech_enabled: bool,
    /// Wrong answers cost a point (floored at zero).
    pub penalty_on_wrong: bool,
    /// With speech off, correct clicks also credit the speech channel.
    pub auto_credit_speech: bool,
    /// Questions come from the relay instead of the local catalog.
    pub networked: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: SessionMode::Solo,
            speech_enabled: false,
            penalty_on_wrong: true,
            auto_credit_speech: true,
            networked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for d in [Difficulty::EASY, Difficulty::MEDIUM, Difficulty::HARD] {
            d.validate().unwrap();
        }
    }

    #[test]
    fn json_override_roundtrip() {
        let json = r#"{
            "fish_count": 7,
            "plant_count": 4,
            "fish_base_speed": 28.0,
            "interaction_goal": 6,
            "speech_goal": 4,
            "sway_period": [1.5, 2.5]
        }"#;
        let d = Difficulty::from_json(json).unwrap();
        assert_eq!(d.fish_count, 7);
        assert_eq!(d.interaction_goal, 6);
    }

    #[test]
    fn zero_population_rejected() {
        let json = r#"{
            "fish_count": 0,
            "plant_count": 4,
            "fish_base_speed": 28.0,
            "interaction_goal": 6,
            "speech_goal": 4,
            "sway_period": [1.5, 2.5]
        }"#;
        assert!(Difficulty::from_json(json).is_err());
    }
}
