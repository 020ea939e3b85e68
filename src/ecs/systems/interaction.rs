//! Answer resolution: the pointer (or a speech transcript) against the
//! current expected answer. Both paths share the plant-growth and
//! achievement machinery; only the streak channel differs.

use crate::adapters::{EventSink, SoundKey};
use crate::config::{SessionSettings, DISABLE_COOLDOWN_TICKS, MAX_SCALE, MIN_SCALE, SCALE_INCREMENT};
use crate::ecs::components::{Agent, Growth, Species, Velocity};
use crate::score::{Achievement, ScoreBoard};
use crate::timer::{TimerAction, TimerQueue};

const FEEDBACK_CORRECT: [&str; 4] = ["Great job!", "Awesome!", "Well done!", "You got it!"];
const FEEDBACK_WRONG: [&str; 4] = ["Try again!", "Not quite!", "Oops!", "Keep looking!"];

/// Resolve a pointer interaction. `clicked` is the agent under the
/// cursor, or `None` for empty water (a no-op, not an error).
///
/// Returns whether the answer was correct.
#[allow(clippy::too_many_arguments)]
pub fn handle_click(
    world: &mut hecs::World,
    score: &mut ScoreBoard,
    settings: &SessionSettings,
    clicked: Option<hecs::Entity>,
    expected: Species,
    rng: &mut fastrand::Rng,
    events: &mut dyn EventSink,
    timers: &mut TimerQueue,
    now_tick: u64,
) -> bool {
    let Some(entity) = clicked else {
        return false;
    };
    let species = match world.get::<&Agent>(entity) {
        Ok(agent) => agent.species,
        Err(_) => return false,
    };

    let correct = species == expected;
    show_feedback(events, rng, correct);

    // Let the feedback animation play without the fish fleeing: suspend
    // its physics briefly. The timer always clears the flag.
    if species.is_fish() {
        if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
            vel.disabled = true;
        }
        timers.schedule(
            now_tick + DISABLE_COOLDOWN_TICKS,
            TimerAction::EnableCollision(entity),
        );
    }

    let speech_shadow = settings.auto_credit_speech && !settings.speech_enabled;
    let mut achievements: Vec<Achievement> = Vec::new();

    if correct {
        if let Some(streak) = score.record_interaction(true, settings.penalty_on_wrong) {
            achievements.push(streak);
        }
        if speech_shadow {
            score.credit_speech();
        }
        if grow_plants(world) && score.latch_mastery() {
            achievements.push(Achievement::Mastery);
        }
    } else {
        let _ = score.record_interaction(false, settings.penalty_on_wrong);
        if speech_shadow && settings.penalty_on_wrong {
            score.debit_speech();
        }
        if shrink_plants(world) && score.latch_wilted() {
            achievements.push(Achievement::Wilted);
        }
    }

    announce(events, &achievements);
    correct
}

/// Resolve a speech transcript against the expected spoken phrase
/// (case-insensitive substring match). Touches only the speech streak.
pub fn handle_speech(
    world: &mut hecs::World,
    score: &mut ScoreBoard,
    settings: &SessionSettings,
    transcript: &str,
    expected_phrase: &str,
    rng: &mut fastrand::Rng,
    events: &mut dyn EventSink,
) -> bool {
    let correct = transcript
        .to_lowercase()
        .contains(&expected_phrase.to_lowercase());
    show_feedback(events, rng, correct);

    score.record_speech(correct, settings.penalty_on_wrong);

    let mut achievements: Vec<Achievement> = Vec::new();
    if correct {
        if grow_plants(world) && score.latch_mastery() {
            achievements.push(Achievement::Mastery);
        }
    } else if shrink_plants(world) && score.latch_wilted() {
        achievements.push(Achievement::Wilted);
    }

    announce(events, &achievements);
    correct
}

fn show_feedback(events: &mut dyn EventSink, rng: &mut fastrand::Rng, correct: bool) {
    let text = if correct {
        FEEDBACK_CORRECT[rng.usize(0..FEEDBACK_CORRECT.len())]
    } else {
        FEEDBACK_WRONG[rng.usize(0..FEEDBACK_WRONG.len())]
    };
    events.show_feedback(text, correct);
    events.play_sound(if correct {
        SoundKey::Correct
    } else {
        SoundKey::Incorrect
    });
}

fn announce(events: &mut dyn EventSink, achievements: &[Achievement]) {
    for a in achievements {
        log::info!("achievement: {}", a.message());
        events.show_achievement(a.message());
    }
}

/// Grow every plant by one clamped step. Returns true when all plants
/// sit at MAX_SCALE afterwards (and at least one plant exists).
pub fn grow_plants(world: &mut hecs::World) -> bool {
    let mut any = false;
    let mut all_max = true;
    for (_, growth) in world.query_mut::<&mut Growth>() {
        any = true;
        growth.scale = (growth.scale + SCALE_INCREMENT).min(MAX_SCALE);
        if growth.scale < MAX_SCALE - 1e-4 {
            all_max = false;
        }
    }
    any && all_max
}

/// Shrink every plant by one clamped step. Returns true when all plants
/// sit at MIN_SCALE afterwards (and at least one plant exists).
pub fn shrink_plants(world: &mut hecs::World) -> bool {
    let mut any = false;
    let mut all_min = true;
    for (_, growth) in world.query_mut::<&mut Growth>() {
        any = true;
        growth.scale = (growth.scale - SCALE_INCREMENT).max(MIN_SCALE);
        if growth.scale > MIN_SCALE + 1e-4 {
            all_min = false;
        }
    }
    any && all_min
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RecordingSink;
    use crate::config::START_SCALE;
    use crate::ecs::components::Position;
    use glam::Vec2;

    fn scene() -> (hecs::World, hecs::Entity) {
        let mut world = hecs::World::new();
        let fish = world.spawn((
            Position(Vec2::new(100.0, 100.0)),
            Velocity {
                v: Vec2::new(25.0, 0.0),
                speed: 25.0,
                disabled: false,
            },
            Agent {
                species: Species::RedFish,
            },
        ));
        for _ in 0..3 {
            world.spawn((
                Position(Vec2::new(200.0, 700.0)),
                Agent {
                    species: Species::GreenPlant,
                },
                Growth { scale: START_SCALE },
            ));
        }
        (world, fish)
    }

    fn ctx() -> (
        ScoreBoard,
        SessionSettings,
        fastrand::Rng,
        RecordingSink,
        TimerQueue,
    ) {
        (
            ScoreBoard::new(),
            SessionSettings::default(),
            fastrand::Rng::with_seed(3),
            RecordingSink::default(),
            TimerQueue::new(),
        )
    }

    fn scales(world: &hecs::World) -> Vec<f32> {
        world
            .query::<&Growth>()
            .iter()
            .map(|(_, g)| g.scale)
            .collect()
    }

    #[test]
    fn empty_space_click_is_a_noop() {
        let (mut world, _) = scene();
        let (mut score, settings, mut rng, mut sink, mut timers) = ctx();

        let correct = handle_click(
            &mut world, &mut score, &settings, None, Species::RedFish, &mut rng, &mut sink,
            &mut timers, 0,
        );

        assert!(!correct);
        assert_eq!(score.interaction_points, 0);
        assert!(sink.feedback.is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn correct_click_scores_grows_and_suspends_physics() {
        let (mut world, fish) = scene();
        let (mut score, settings, mut rng, mut sink, mut timers) = ctx();

        let correct = handle_click(
            &mut world,
            &mut score,
            &settings,
            Some(fish),
            Species::RedFish,
            &mut rng,
            &mut sink,
            &mut timers,
            10,
        );

        assert!(correct);
        assert_eq!(score.interaction_points, 1);
        // speech auto-credited while speech mode is off
        assert_eq!(score.speech_points, 1);
        assert_eq!(score.interaction_streak, 1);
        assert!(scales(&world).iter().all(|&s| (s - 1.1).abs() < 1e-4));
        assert!(world.get::<&Velocity>(fish).unwrap().disabled);
        assert!(!timers.is_empty());
        assert_eq!(sink.sounds, vec![SoundKey::Correct]);
    }

    #[test]
    fn wrong_click_penalizes_with_floor_and_shrinks() {
        let (mut world, fish) = scene();
        let (mut score, settings, mut rng, mut sink, mut timers) = ctx();
        score.interaction_points = 1;
        score.interaction_streak = 4;

        let correct = handle_click(
            &mut world,
            &mut score,
            &settings,
            Some(fish),
            Species::BlueFish,
            &mut rng,
            &mut sink,
            &mut timers,
            0,
        );

        assert!(!correct);
        assert_eq!(score.interaction_points, 0);
        assert_eq!(score.interaction_streak, 0);
        assert!(scales(&world).iter().all(|&s| (s - 0.9).abs() < 1e-4));

        // another wrong answer: already at the floor, stays there
        handle_click(
            &mut world,
            &mut score,
            &settings,
            Some(fish),
            Species::BlueFish,
            &mut rng,
            &mut sink,
            &mut timers,
            0,
        );
        assert_eq!(score.interaction_points, 0);
    }

    #[test]
    fn growth_clamps_and_mastery_fires_once() {
        let (mut world, fish) = scene();
        let (mut score, settings, mut rng, mut sink, mut timers) = ctx();

        // Enough correct answers to saturate growth and keep going.
        for tick in 0..20 {
            handle_click(
                &mut world,
                &mut score,
                &settings,
                Some(fish),
                Species::RedFish,
                &mut rng,
                &mut sink,
                &mut timers,
                tick,
            );
        }

        assert!(scales(&world).iter().all(|&s| s <= MAX_SCALE + 1e-6));
        assert!(scales(&world).iter().all(|&s| (s - MAX_SCALE).abs() < 1e-4));
        let mastery_count = sink
            .achievements
            .iter()
            .filter(|m| *m == Achievement::Mastery.message())
            .count();
        assert_eq!(mastery_count, 1);
    }

    #[test]
    fn wilted_latch_fires_once_at_min() {
        let (mut world, fish) = scene();
        let (mut score, settings, mut rng, mut sink, mut timers) = ctx();

        for _ in 0..20 {
            handle_click(
                &mut world,
                &mut score,
                &settings,
                Some(fish),
                Species::BlueFish,
                &mut rng,
                &mut sink,
                &mut timers,
                0,
            );
        }

        assert!(scales(&world).iter().all(|&s| (s - MIN_SCALE).abs() < 1e-4));
        let wilted_count = sink
            .achievements
            .iter()
            .filter(|m| *m == Achievement::Wilted.message())
            .count();
        assert_eq!(wilted_count, 1);
    }

    #[test]
    fn streak_achievements_reach_the_sink() {
        let (mut world, fish) = scene();
        let (mut score, settings, mut rng, mut sink, mut timers) = ctx();

        for _ in 0..5 {
            handle_click(
                &mut world,
                &mut score,
                &settings,
                Some(fish),
                Species::RedFish,
                &mut rng,
                &mut sink,
                &mut timers,
                0,
            );
        }

        assert!(sink
            .achievements
            .iter()
            .any(|m| m == Achievement::StreakFive.message()));
    }

    #[test]
    fn speech_match_is_case_insensitive_substring() {
        let (mut world, _) = scene();
        let (mut score, settings, mut rng, mut sink, _) = ctx();

        let ok = handle_speech(
            &mut world,
            &mut score,
            &settings,
            "I think it is the RED Fish over there",
            "red fish",
            &mut rng,
            &mut sink,
        );
        assert!(ok);
        assert_eq!(score.speech_points, 1);
        assert_eq!(score.speech_streak, 1);
        assert_eq!(score.interaction_streak, 0, "click streak untouched");

        let bad = handle_speech(
            &mut world,
            &mut score,
            &settings,
            "blue fish",
            "red fish",
            &mut rng,
            &mut sink,
        );
        assert!(!bad);
        assert_eq!(score.speech_streak, 0);
        assert_eq!(score.speech_points, 0);
    }
}
