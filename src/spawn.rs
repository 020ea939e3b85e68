//! Scene population. Wild fish scatter over the whole swim area, banks
//! spawn as spaced clusters with one shared velocity, and plants take
//! root in the sand band along the bottom edge. Placement uses bounded
//! rejection sampling; after the retry budget the last candidate is
//! accepted so population counts always hold exactly.

use glam::Vec2;

use crate::adapters::RenderAdapter;
use crate::config::{
    Difficulty, BANK_COUNT, BANK_MEMBER_SPACING, BANK_SIZE, BANK_SPACING, PLANT_SPACING,
    SAND_BAND, SCREEN_HEIGHT, SCREEN_WIDTH, START_SCALE, SWIM_DEPTH,
};
use crate::ecs::components::{
    Agent, Bank, Facing, Growth, Position, ScenePhase, Species, Sway, Velocity, Visual,
    FISH_SPECIES, PLANT_SPECIES,
};

/// Placement attempts before giving up on spacing.
const PLACEMENT_RETRIES: usize = 20;
/// Plants keep this much clearance above the very bottom edge.
const PLANT_BOTTOM_MARGIN: f32 = 50.0;

/// Populate a fresh world from the difficulty parameters and return the
/// scene-phase singleton entity.
pub fn populate(
    world: &mut hecs::World,
    rng: &mut fastrand::Rng,
    difficulty: &Difficulty,
    render: &mut dyn RenderAdapter,
) -> hecs::Entity {
    spawn_wild_fish(world, rng, difficulty, render);
    spawn_banks(world, rng, difficulty, render);
    spawn_plants(world, rng, difficulty, render);

    log::debug!(
        "scene populated: {} wild fish, {} banks, {} plants",
        difficulty.fish_count,
        BANK_COUNT,
        difficulty.plant_count
    );
    world.spawn((ScenePhase::Intro,))
}

/// Destroy every visual and despawn every entity, for a session restart.
pub fn clear(world: &mut hecs::World, render: &mut dyn RenderAdapter) {
    let all: Vec<hecs::Entity> = world.iter().map(|e| e.entity()).collect();
    for entity in all {
        if let Ok(visual) = world.get::<&Visual>(entity) {
            render.destroy(visual.0);
        }
        let _ = world.despawn(entity);
    }
}

fn spawn_wild_fish(
    world: &mut hecs::World,
    rng: &mut fastrand::Rng,
    difficulty: &Difficulty,
    render: &mut dyn RenderAdapter,
) {
    for _ in 0..difficulty.fish_count {
        let species = FISH_SPECIES[rng.usize(0..FISH_SPECIES.len())];
        let pos = Vec2::new(rng.f32() * SCREEN_WIDTH, rng.f32() * SWIM_DEPTH);
        let speed = difficulty.fish_base_speed * (0.9 + rng.f32() * 0.2);
        let angle = rng.f32() * std::f32::consts::TAU;
        let v = Vec2::new(angle.cos(), angle.sin()) * speed;

        let visual = render.create_visual(species, pos.x, pos.y);
        render.play(visual, species.animation());
        world.spawn((
            Position(pos),
            Velocity {
                v,
                speed,
                disabled: false,
            },
            Facing {
                angle: v.y.atan2(v.x),
                flipped: v.x < 0.0,
            },
            Agent { species },
            Visual(visual),
        ));
    }
}

fn spawn_banks(
    world: &mut hecs::World,
    rng: &mut fastrand::Rng,
    difficulty: &Difficulty,
    render: &mut dyn RenderAdapter,
) {
    let mut centers: Vec<Vec2> = Vec::with_capacity(BANK_COUNT);
    for bank_id in 0..BANK_COUNT {
        let center = place_spaced(&centers, BANK_SPACING, || {
            Vec2::new(
                BANK_SPACING + rng.f32() * (SCREEN_WIDTH - 2.0 * BANK_SPACING),
                BANK_SPACING + rng.f32() * (SWIM_DEPTH - 2.0 * BANK_SPACING),
            )
        });
        centers.push(center);

        // One distinct species per member, one velocity for the school.
        let mut species_pool = FISH_SPECIES;
        rng.shuffle(&mut species_pool);
        let speed = difficulty.fish_base_speed;
        let vx = if rng.bool() { speed } else { -speed };
        let v = Vec2::new(vx, 0.0);

        for (member, &species) in species_pool.iter().take(BANK_SIZE).enumerate() {
            let offset = Vec2::new(
                (member as f32 - (BANK_SIZE - 1) as f32 / 2.0) * BANK_MEMBER_SPACING,
                (rng.f32() - 0.5) * BANK_MEMBER_SPACING,
            );
            let pos = (center + offset).clamp(Vec2::ZERO, Vec2::new(SCREEN_WIDTH, SWIM_DEPTH));

            let visual = render.create_visual(species, pos.x, pos.y);
            render.play(visual, species.animation());
            world.spawn((
                Position(pos),
                Velocity {
                    v,
                    speed,
                    disabled: false,
                },
                Facing {
                    angle: 0.0,
                    flipped: vx < 0.0,
                },
                Bank(bank_id as u8),
                Agent { species },
                Visual(visual),
            ));
        }
    }
}

fn spawn_plants(
    world: &mut hecs::World,
    rng: &mut fastrand::Rng,
    difficulty: &Difficulty,
    render: &mut dyn RenderAdapter,
) {
    let band_top = SCREEN_HEIGHT - SAND_BAND;
    let band_bottom = SCREEN_HEIGHT - PLANT_BOTTOM_MARGIN;

    let mut placed: Vec<Vec2> = Vec::with_capacity(difficulty.plant_count);
    for _ in 0..difficulty.plant_count {
        let pos = place_spaced(&placed, PLANT_SPACING, || {
            Vec2::new(
                rng.f32() * SCREEN_WIDTH,
                band_top + rng.f32() * (band_bottom - band_top),
            )
        });
        placed.push(pos);

        let species = PLANT_SPECIES[rng.usize(0..PLANT_SPECIES.len())];
        let (lo, hi) = difficulty.sway_period;
        let period = lo + rng.f32() * (hi - lo);

        let visual = render.create_visual(species, pos.x, pos.y);
        render.play(visual, species.animation());
        world.spawn((
            Position(pos),
            Agent { species },
            Growth { scale: START_SCALE },
            Sway {
                phase: rng.f32() * std::f32::consts::TAU,
                freq: std::f32::consts::TAU / period,
                angle: 0.0,
            },
            Visual(visual),
        ));
    }
}

/// Sample candidates until one keeps `spacing` from everything already
/// placed, or the retry budget runs out.
fn place_spaced(placed: &[Vec2], spacing: f32, mut candidate: impl FnMut() -> Vec2) -> Vec2 {
    let spacing_sq = spacing * spacing;
    let mut pos = candidate();
    for _ in 0..PLACEMENT_RETRIES {
        if placed
            .iter()
            .all(|p| (*p - pos).length_squared() >= spacing_sq)
        {
            break;
        }
        pos = candidate();
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::NullRender;

    fn populated() -> (hecs::World, NullRender) {
        let mut world = hecs::World::new();
        let mut render = NullRender::default();
        let mut rng = fastrand::Rng::with_seed(11);
        populate(&mut world, &mut rng, &Difficulty::MEDIUM, &mut render);
        (world, render)
    }

    #[test]
    fn populations_match_difficulty() {
        let (world, render) = populated();
        let d = Difficulty::MEDIUM;

        let wild = world
            .query::<hecs::Without<(&Agent, &Velocity), &Bank>>()
            .iter()
            .count();
        let banked = world.query::<(&Agent, &Bank)>().iter().count();
        let plants = world.query::<&Growth>().iter().count();

        assert_eq!(wild, d.fish_count);
        assert_eq!(banked, BANK_COUNT * BANK_SIZE);
        assert_eq!(plants, d.plant_count);
        assert_eq!(render.live, d.fish_count + BANK_COUNT * BANK_SIZE + d.plant_count);
    }

    #[test]
    fn bank_members_share_velocity_and_have_distinct_species() {
        let (world, _) = populated();

        for bank_id in 0..BANK_COUNT as u8 {
            let members: Vec<(Velocity, Species)> = world
                .query::<(&Velocity, &Bank, &Agent)>()
                .iter()
                .filter(|(_, (_, b, _))| b.0 == bank_id)
                .map(|(_, (v, _, a))| (*v, a.species))
                .collect();
            assert_eq!(members.len(), BANK_SIZE);
            assert!(members.windows(2).all(|w| w[0].0.v == w[1].0.v));

            let mut seen: Vec<Species> = members.iter().map(|(_, s)| *s).collect();
            seen.sort_by_key(|s| *s as u8);
            seen.dedup();
            assert_eq!(seen.len(), BANK_SIZE, "bank species must be distinct");
        }
    }

    #[test]
    fn plants_root_in_the_sand_band() {
        let (world, _) = populated();
        for (_, (pos, _)) in world.query::<(&Position, &Growth)>().iter() {
            assert!(pos.0.y >= SCREEN_HEIGHT - SAND_BAND);
            assert!(pos.0.y <= SCREEN_HEIGHT - PLANT_BOTTOM_MARGIN);
            assert!(pos.0.x >= 0.0 && pos.0.x <= SCREEN_WIDTH);
        }
    }

    #[test]
    fn everything_starts_inside_the_swim_area() {
        let (world, _) = populated();
        for (_, (pos, _)) in world.query::<(&Position, &Velocity)>().iter() {
            assert!(pos.0.x >= 0.0 && pos.0.x <= SCREEN_WIDTH);
            assert!(pos.0.y >= 0.0 && pos.0.y <= SWIM_DEPTH);
        }
    }

    #[test]
    fn clear_despawns_and_destroys() {
        let (mut world, mut render) = populated();
        assert!(render.live > 0);
        clear(&mut world, &mut render);
        assert_eq!(world.len(), 0);
        assert_eq!(render.live, 0);
    }
}
