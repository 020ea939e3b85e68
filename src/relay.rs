//! In-process relay for networked sessions. Mirrors the hosted relay's
//! behavior: it hands out random catalog questions, keeps a per-player
//! score ledger, and declares a winner when one player reaches both
//! goals. Everything is synchronous under the hood; the `NetAdapter`
//! surface still looks asynchronous (request now, poll later) so a real
//! socket-backed relay can slot in unchanged.

use std::collections::HashMap;

use crate::adapters::{NetAdapter, ScoreUpdate};
use crate::quiz::questions::{Question, CATALOG};

/// Click and speech points a player needs for the relay to call the game.
const RELAY_INTERACTION_GOAL: u32 = 10;
const RELAY_SPEECH_GOAL: u32 = 5;

#[derive(Default)]
pub struct LocalRelay {
    rng: fastrand::Rng,
    pending_question: Option<Question>,
    ledger: HashMap<String, (u32, u32)>,
    game_over: Option<String>,
    over_delivered: bool,
}

impl LocalRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            ..Self::default()
        }
    }

    pub fn scores(&self, player: &str) -> Option<(u32, u32)> {
        self.ledger.get(player).copied()
    }

    fn ended(&self) -> bool {
        self.game_over.is_some()
    }
}

impl NetAdapter for LocalRelay {
    fn request_question(&mut self) {
        if self.ended() {
            log::debug!("question requested after game end; ignored");
            return;
        }
        let q = CATALOG[self.rng.usize(0..CATALOG.len())].clone();
        self.pending_question = Some(q);
    }

    fn poll_validated_question(&mut self) -> Option<Question> {
        self.pending_question.take()
    }

    fn send_score_update(&mut self, update: &ScoreUpdate) {
        if self.ended() {
            return;
        }
        self.ledger.insert(
            update.player.clone(),
            (update.interaction_score, update.speech_score),
        );
        if update.interaction_score >= RELAY_INTERACTION_GOAL
            && update.speech_score >= RELAY_SPEECH_GOAL
        {
            log::info!("relay: {} reached both goals", update.player);
            self.game_over = Some(format!("{} wins!", update.player));
        }
    }

    fn send_game_end(&mut self, message: &str) {
        if self.ended() {
            log::debug!("game already ended; keeping the original message");
            return;
        }
        self.game_over = Some(message.to_string());
    }

    fn poll_game_over(&mut self) -> Option<String> {
        if self.over_delivered {
            return None;
        }
        let msg = self.game_over.clone()?;
        self.over_delivered = true;
        Some(msg)
    }
}
