use glam::Vec2;

use crate::adapters::VisualId;

/// Authoritative simulation position, distinct from any visual-layer
/// coordinates the render adapter keeps.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

/// Direction vector with a decoupled speed scalar. Steering changes the
/// direction of `v` only; its magnitude is kept equal to `speed`.
#[derive(Debug, Clone, Copy)]
pub struct Velocity {
    pub v: Vec2,
    pub speed: f32,
    /// Suspends steering and boundary reflection for a short cooldown
    /// after an answer click. Always cleared by a timer.
    pub disabled: bool,
}

/// The creature and plant catalog. A question's answer key is a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Species {
    BlueFish,
    RedFish,
    GreenFish,
    OrangeFish,
    PurpleFish,
    GlobeFish,
    GreyFish,
    GreenPlant,
    PurplePlant,
    BluePlant,
    OrangePlant,
}

pub const FISH_SPECIES: [Species; 7] = [
    Species::BlueFish,
    Species::RedFish,
    Species::GreenFish,
    Species::OrangeFish,
    Species::PurpleFish,
    Species::GlobeFish,
    Species::GreyFish,
];

pub const PLANT_SPECIES: [Species; 4] = [
    Species::GreenPlant,
    Species::PurplePlant,
    Species::BluePlant,
    Species::OrangePlant,
];

impl Species {
    pub fn is_fish(self) -> bool {
        matches!(
            self,
            Species::BlueFish
                | Species::RedFish
                | Species::GreenFish
                | Species::OrangeFish
                | Species::PurpleFish
                | Species::GlobeFish
                | Species::GreyFish
        )
    }

    pub fn is_plant(self) -> bool {
        !self.is_fish()
    }

    /// Animation key for the render adapter.
    pub fn animation(self) -> &'static str {
        match self {
            Species::BlueFish => "blueFish",
            Species::RedFish => "redFish",
            Species::GreenFish => "greenFish",
            Species::OrangeFish => "orangeFish",
            Species::PurpleFish => "purpleFish",
            Species::GlobeFish => "globeFish",
            Species::GreyFish => "greyFish",
            Species::GreenPlant => "greenPlant",
            Species::PurplePlant => "purplePlant",
            Species::BluePlant => "bluePlant",
            Species::OrangePlant => "orangePlant",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Species::BlueFish => "blue fish",
            Species::RedFish => "red fish",
            Species::GreenFish => "green fish",
            Species::OrangeFish => "orange fish",
            Species::PurpleFish => "purple fish",
            Species::GlobeFish => "globe fish",
            Species::GreyFish => "grey fish",
            Species::GreenPlant => "green plant",
            Species::PurplePlant => "purple plant",
            Species::BluePlant => "blue plant",
            Species::OrangePlant => "orange plant",
        }
    }
}

/// Classifies an entity as a quiz-answerable creature or plant.
#[derive(Debug, Clone, Copy)]
pub struct Agent {
    pub species: Species,
}

/// Membership in a synchronized school. All members of one bank hold
/// identical velocity and turn in unison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bank(pub u8);

/// Shared growth scale, plants only. Every answer moves every plant's
/// scale by the same clamped step.
#[derive(Debug, Clone, Copy)]
pub struct Growth {
    pub scale: f32,
}

/// Plant-only sway parameters; `angle` is the current visual lean,
/// a pure function of elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct Sway {
    pub phase: f32,
    /// Angular frequency in radians/second.
    pub freq: f32,
    pub angle: f32,
}

/// Derived orientation pushed to the render adapter. Sprites moving in
/// the negative-x direction are mirrored instead of rotated upside down.
#[derive(Debug, Clone, Copy)]
pub struct Facing {
    pub angle: f32,
    pub flipped: bool,
}

/// Handle of the visual created for this entity by the render adapter.
#[derive(Debug, Clone, Copy)]
pub struct Visual(pub VisualId);

/// Coarse lifecycle marker held by a singleton entity and consumed at
/// the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Intro,
    Gameplay,
}
