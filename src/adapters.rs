//! Collaborator boundaries. The simulation core talks to rendering,
//! audio/feedback, speech recognition, and the relay server only through
//! these traits; it never waits on any of them.

use crate::ecs::components::Species;
use crate::quiz::questions::Question;

/// Opaque handle to a visual created by the render adapter. The handle
/// to entity mapping lives in the world as a `Visual` component so
/// pointer hits can be resolved back to entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualId(pub u64);

/// Sounds the core may request. Keys, not assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKey {
    Correct,
    Incorrect,
    CountdownTick,
    Woosh,
    Fanfare,
}

/// Scene/renderer contract. The core pushes state; it never reads
/// anything back from the visual layer.
pub trait RenderAdapter {
    fn create_visual(&mut self, species: Species, x: f32, y: f32) -> VisualId;
    fn set_position(&mut self, id: VisualId, x: f32, y: f32);
    fn set_rotation(&mut self, id: VisualId, radians: f32);
    fn set_flip(&mut self, id: VisualId, flipped: bool);
    fn set_scale(&mut self, id: VisualId, scale: f32);
    fn play(&mut self, id: VisualId, animation: &str);
    fn destroy(&mut self, id: VisualId);
}

/// Fire-and-forget audio / feedback-text / achievement notifications.
pub trait EventSink {
    fn play_sound(&mut self, key: SoundKey);
    fn show_feedback(&mut self, text: &str, correct: bool);
    fn show_achievement(&mut self, message: &str);
}

/// One poll result from the speech recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechResult {
    Transcript(String),
    /// Recognition failed or is unavailable; the answer window continues
    /// without speech scoring.
    Unavailable,
}

/// Async single-shot speech recognition, polled once per tick while an
/// answer window is open.
pub trait SpeechAdapter {
    fn start_listening(&mut self, expected_phrase: &str);
    fn poll(&mut self) -> Option<SpeechResult>;
    fn stop(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub player: String,
    pub interaction_score: u32,
    pub speech_score: u32,
}

/// Relay contract for networked sessions. A server-validated question is
/// treated exactly like a locally generated one after the feasibility
/// check.
pub trait NetAdapter {
    fn request_question(&mut self);
    fn poll_validated_question(&mut self) -> Option<Question>;
    fn send_score_update(&mut self, update: &ScoreUpdate);
    fn send_game_end(&mut self, message: &str);
    fn poll_game_over(&mut self) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Headless implementations
// ---------------------------------------------------------------------------

/// Renderer that allocates handles and discards everything else. Used by
/// the headless demo and tests.
#[derive(Default)]
pub struct NullRender {
    next_id: u64,
    pub live: usize,
}

impl RenderAdapter for NullRender {
    fn create_visual(&mut self, _species: Species, _x: f32, _y: f32) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        self.live += 1;
        id
    }

    fn set_position(&mut self, _id: VisualId, _x: f32, _y: f32) {}
    fn set_rotation(&mut self, _id: VisualId, _radians: f32) {}
    fn set_flip(&mut self, _id: VisualId, _flipped: bool) {}
    fn set_scale(&mut self, _id: VisualId, _scale: f32) {}
    fn play(&mut self, _id: VisualId, _animation: &str) {}

    fn destroy(&mut self, _id: VisualId) {
        self.live = self.live.saturating_sub(1);
    }
}

/// Event sink that records everything it is told, for assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub sounds: Vec<SoundKey>,
    pub feedback: Vec<(String, bool)>,
    pub achievements: Vec<String>,
}

impl EventSink for RecordingSink {
    fn play_sound(&mut self, key: SoundKey) {
        self.sounds.push(key);
    }

    fn show_feedback(&mut self, text: &str, correct: bool) {
        self.feedback.push((text.to_string(), correct));
    }

    fn show_achievement(&mut self, message: &str) {
        self.achievements.push(message.to_string());
    }
}

/// Speech adapter fed from a queue of canned results. Each
/// `start_listening` arms the next queued result for the following poll.
#[derive(Default)]
pub struct ScriptedSpeech {
    queue: std::collections::VecDeque<SpeechResult>,
    armed: Option<SpeechResult>,
    pub listening: bool,
}

impl ScriptedSpeech {
    pub fn push(&mut self, result: SpeechResult) {
        self.queue.push_back(result);
    }
}

impl SpeechAdapter for ScriptedSpeech {
    fn start_listening(&mut self, _expected_phrase: &str) {
        self.listening = true;
        self.armed = self.queue.pop_front();
    }

    fn poll(&mut self) -> Option<SpeechResult> {
        if !self.listening {
            return None;
        }
        let out = self.armed.take();
        if out.is_some() {
            self.listening = false;
        }
        out
    }

    fn stop(&mut self) {
        self.listening = false;
        self.armed = None;
    }
}
