//! Headless demo driver: runs a solo easy session and answers every
//! question by pointing at the right species, logging the run as it goes.
//! `RUST_LOG=info cargo run` to watch it play itself.

use aqualingo::adapters::{EventSink, NullRender, SoundKey};
use aqualingo::{Difficulty, Session, SessionSettings};

/// Give up if the demo has not won after this many ticks.
const MAX_TICKS: u64 = 120_000;

struct LogSink;

impl EventSink for LogSink {
    fn play_sound(&mut self, key: SoundKey) {
        log::debug!("sound: {key:?}");
    }

    fn show_feedback(&mut self, text: &str, correct: bool) {
        log::info!("feedback ({}): {text}", if correct { "correct" } else { "wrong" });
    }

    fn show_achievement(&mut self, message: &str) {
        log::info!("achievement: {message}");
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> aqualingo::Result<()> {
    let mut session = Session::new(
        Difficulty::EASY,
        SessionSettings::default(),
        "Demo",
        Vec::new(),
        Box::new(NullRender::default()),
        Box::new(LogSink),
        None,
        None,
        fastrand::Rng::new(),
    )?;

    for _ in 0..MAX_TICKS {
        session.step();

        if let Some(message) = session.game_over_message() {
            log::info!(
                "finished at tick {}: {message} ({} click / {} speech points)",
                session.tick_count(),
                session.score().interaction_points,
                session.score().speech_points
            );
            return Ok(());
        }

        if session.turn().input_open() {
            if let Some(target) = session
                .current_question()
                .map(|q| q.answer)
                .and_then(|s| session.agent_position(s))
            {
                session.pointer_down(target.x, target.y);
            }
        }
    }

    log::warn!("demo hit the tick limit without winning");
    Ok(())
}
