//! The vocabulary question catalog and the feasibility filter. A scene
//! populates its agents randomly, so some species may simply not exist;
//! the picker must never produce a question whose answer cannot be on
//! screen.

use std::collections::HashSet;

use crate::ecs::components::{Agent, Species};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: u32,
    pub prompt: &'static str,
    pub answer: Species,
    /// Expected spoken phrase, matched case-insensitively.
    pub speech_answer: &'static str,
}

pub const CATALOG: [Question; 11] = [
    Question { id: 1, prompt: "Click the red fish", answer: Species::RedFish, speech_answer: "red fish" },
    Question { id: 2, prompt: "Click the blue fish", answer: Species::BlueFish, speech_answer: "blue fish" },
    Question { id: 3, prompt: "Click the orange fish", answer: Species::OrangeFish, speech_answer: "orange fish" },
    Question { id: 4, prompt: "Click the green fish", answer: Species::GreenFish, speech_answer: "green fish" },
    Question { id: 5, prompt: "Click the globe fish", answer: Species::GlobeFish, speech_answer: "globe fish" },
    Question { id: 6, prompt: "Click the grey fish", answer: Species::GreyFish, speech_answer: "grey fish" },
    Question { id: 7, prompt: "Click the purple fish", answer: Species::PurpleFish, speech_answer: "purple fish" },
    Question { id: 8, prompt: "Click the purple plant", answer: Species::PurplePlant, speech_answer: "purple plant" },
    Question { id: 9, prompt: "Click the green plant", answer: Species::GreenPlant, speech_answer: "green plant" },
    Question { id: 10, prompt: "Click the blue plant", answer: Species::BluePlant, speech_answer: "blue plant" },
    Question { id: 11, prompt: "Click the orange plant", answer: Species::OrangePlant, speech_answer: "orange plant" },
];

/// Species that actually exist in the current scene.
pub fn materialized_species(world: &hecs::World) -> HashSet<Species> {
    let mut present = HashSet::new();
    for (_, agent) in world.query::<&Agent>().iter() {
        present.insert(agent.species);
    }
    present
}

/// True if the question's answer can be found on screen.
pub fn is_feasible(world: &hecs::World, question: &Question) -> bool {
    world
        .query::<&Agent>()
        .iter()
        .any(|(_, agent)| agent.species == question.answer)
}

/// Pick a random question whose answer is materialized in the scene.
///
/// An empty feasible set means the scene was configured without any
/// catalog species; fall back to re-asking `previous` when there is one,
/// otherwise report the situation and return `None` so the caller can
/// idle instead of asking an unanswerable question.
pub fn generate_valid_question(
    world: &hecs::World,
    rng: &mut fastrand::Rng,
    previous: Option<&Question>,
) -> Option<Question> {
    let present = materialized_species(world);
    let feasible: Vec<&Question> = CATALOG
        .iter()
        .filter(|q| present.contains(&q.answer))
        .collect();

    if feasible.is_empty() {
        return match previous {
            Some(q) => {
                log::warn!("no feasible questions in scene; re-asking question {}", q.id);
                Some(q.clone())
            }
            None => {
                log::warn!("no feasible questions in scene and nothing to re-ask");
                None
            }
        };
    }

    Some(feasible[rng.usize(0..feasible.len())].clone())
}
