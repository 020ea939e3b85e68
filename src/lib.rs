//! Core of an ocean-themed vocabulary game: a fish-and-plant swarm
//! simulation on a fixed timestep, a quiz turn machine layered on top,
//! and narrow adapter traits at the rendering, audio, speech, and
//! network boundaries so the whole thing runs headless.

pub mod adapters;
pub mod config;
pub mod ecs;
pub mod error;
pub mod quiz;
pub mod relay;
pub mod score;
pub mod session;
pub mod spatial;
pub mod spawn;
pub mod timer;

pub use config::{Difficulty, SessionMode, SessionSettings};
pub use error::{Result, SessionError};
pub use session::Session;
