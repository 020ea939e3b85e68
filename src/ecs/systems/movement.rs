use glam::Vec2;
use hecs::Without;

use crate::config::{SCREEN_WIDTH, SWIM_DEPTH};
use crate::ecs::components::{Bank, Facing, Position, Sway, Velocity};

/// Energy lost on a vertical reflection, so fish do not gain speed
/// bouncing off the surface or the sand line.
const VERTICAL_DAMPING: f32 = 0.8;
/// Maximum plant lean in radians (~5 degrees).
const SWAY_AMPLITUDE: f32 = 0.087;

/// Integrate free-swimming fish: advance by velocity, reflect at the
/// water bounds, face the direction of travel. A `disabled` fish (just
/// clicked, feedback playing) drifts on its raw vector with no walls and
/// no steering until its cooldown timer clears the flag.
pub fn integrate(world: &mut hecs::World, dt: f32) {
    for (_, (pos, vel, facing)) in
        world.query_mut::<Without<(&mut Position, &mut Velocity, &mut Facing), &Bank>>()
    {
        pos.0 += vel.v * dt;

        if vel.disabled {
            continue;
        }

        reflect(pos, vel);
        *facing = facing_of(vel.v);
    }
}

/// Reflect at the horizontal screen edges and at the vertical band
/// between the surface and the sand line.
fn reflect(pos: &mut Position, vel: &mut Velocity) {
    if pos.0.x < 0.0 {
        pos.0.x = 0.0;
        vel.v.x = vel.v.x.abs();
    } else if pos.0.x > SCREEN_WIDTH {
        pos.0.x = SCREEN_WIDTH;
        vel.v.x = -vel.v.x.abs();
    }

    if pos.0.y < 0.0 {
        pos.0.y = 0.0;
        vel.v.y = vel.v.y.abs() * VERTICAL_DAMPING;
    } else if pos.0.y > SWIM_DEPTH {
        pos.0.y = SWIM_DEPTH;
        vel.v.y = -vel.v.y.abs() * VERTICAL_DAMPING;
    }
}

fn facing_of(v: Vec2) -> Facing {
    Facing {
        angle: v.y.atan2(v.x),
        flipped: v.x < 0.0,
    }
}

/// Advance fish banks. Members move independently, but the moment any
/// member crosses a horizontal bound the whole bank adopts the reversed
/// horizontal direction on the same tick: a school turn, not per-fish
/// drift.
pub fn update_banks(world: &mut hecs::World, dt: f32) {
    // Pass 1: integrate and record which banks must turn. The first
    // member to trigger supplies the shared reversed vx.
    let mut reversals: Vec<(u8, f32)> = Vec::new();
    for (_, (pos, vel, bank)) in world.query_mut::<(&mut Position, &mut Velocity, &Bank)>() {
        pos.0 += vel.v * dt;
        pos.0.y = pos.0.y.clamp(0.0, SWIM_DEPTH);

        let hit_left = pos.0.x < 0.0 && vel.v.x < 0.0;
        let hit_right = pos.0.x > SCREEN_WIDTH && vel.v.x > 0.0;
        if (hit_left || hit_right) && !reversals.iter().any(|(id, _)| *id == bank.0) {
            reversals.push((bank.0, -vel.v.x));
        }
    }

    // Pass 2: apply the shared direction to every member and re-orient.
    for (_, (vel, bank, facing)) in world.query_mut::<(&mut Velocity, &Bank, &mut Facing)>() {
        if let Some((_, new_vx)) = reversals.iter().find(|(id, _)| *id == bank.0) {
            vel.v.x = *new_vx;
        }
        *facing = facing_of(vel.v);
    }
}

/// Plants never move; their visual lean is a smooth bounded function of
/// elapsed time alone.
pub fn sway_plants(world: &mut hecs::World, elapsed: f32) {
    for (_, sway) in world.query_mut::<&mut Sway>() {
        sway.angle = SWAY_AMPLITUDE * (elapsed * sway.freq + sway.phase).sin();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Agent, Species};

    fn fish(world: &mut hecs::World, pos: Vec2, v: Vec2, speed: f32) -> hecs::Entity {
        world.spawn((
            Position(pos),
            Velocity {
                v,
                speed,
                disabled: false,
            },
            Facing {
                angle: 0.0,
                flipped: false,
            },
            Agent {
                species: Species::BlueFish,
            },
        ))
    }

    #[test]
    fn right_bound_reflects_and_contains() {
        let mut world = hecs::World::new();
        let e = fish(
            &mut world,
            Vec2::new(SCREEN_WIDTH - 0.5, 300.0),
            Vec2::new(60.0, 0.0),
            60.0,
        );

        integrate(&mut world, 0.1);
        {
            let vel = world.get::<&Velocity>(e).unwrap();
            assert!(vel.v.x < 0.0, "vx should flip on the crossing tick");
        }

        integrate(&mut world, 0.1);
        let pos = world.get::<&Position>(e).unwrap();
        assert!(pos.0.x <= SCREEN_WIDTH, "no escape on the following tick");
    }

    #[test]
    fn surface_reflection_is_damped() {
        let mut world = hecs::World::new();
        let e = fish(
            &mut world,
            Vec2::new(500.0, SWIM_DEPTH - 0.5),
            Vec2::new(0.0, 50.0),
            50.0,
        );

        integrate(&mut world, 0.1);
        let vel = world.get::<&Velocity>(e).unwrap();
        assert!(vel.v.y < 0.0);
        assert!((vel.v.y.abs() - 50.0 * VERTICAL_DAMPING).abs() < 1e-3);
    }

    #[test]
    fn disabled_fish_ignores_walls() {
        let mut world = hecs::World::new();
        let e = fish(
            &mut world,
            Vec2::new(SCREEN_WIDTH - 0.5, 300.0),
            Vec2::new(60.0, 0.0),
            60.0,
        );
        world.get::<&mut Velocity>(e).unwrap().disabled = true;

        integrate(&mut world, 0.1);
        let vel = world.get::<&Velocity>(e).unwrap();
        assert!(vel.v.x > 0.0, "no reflection while disabled");
    }

    #[test]
    fn facing_mirrors_when_swimming_left() {
        let mut world = hecs::World::new();
        let e = fish(&mut world, Vec2::new(500.0, 300.0), Vec2::new(-30.0, 0.0), 30.0);
        integrate(&mut world, 0.01);
        let facing = world.get::<&Facing>(e).unwrap();
        assert!(facing.flipped);
    }

    #[test]
    fn bank_turns_in_unison() {
        let mut world = hecs::World::new();
        let mut members = Vec::new();
        for i in 0..5 {
            let x = SCREEN_WIDTH - 30.0 + i as f32 * 10.0; // last member crosses first
            members.push(world.spawn((
                Position(Vec2::new(x, 200.0)),
                Velocity {
                    v: Vec2::new(50.0, 0.0),
                    speed: 50.0,
                    disabled: false,
                },
                Facing {
                    angle: 0.0,
                    flipped: false,
                },
                Bank(0),
                Agent {
                    species: Species::RedFish,
                },
            )));
        }

        update_banks(&mut world, 1.0);

        for &e in &members {
            let vel = world.get::<&Velocity>(e).unwrap();
            assert_eq!(vel.v.x, -50.0, "every member adopts the reversal");
            let facing = world.get::<&Facing>(e).unwrap();
            assert!(facing.flipped);
        }
    }

    #[test]
    fn bank_members_share_velocity_after_reversal() {
        let mut world = hecs::World::new();
        for i in 0..3 {
            world.spawn((
                Position(Vec2::new(10.0 + i as f32 * 20.0, 200.0)),
                Velocity {
                    v: Vec2::new(-40.0, 0.0),
                    speed: 40.0,
                    disabled: false,
                },
                Facing {
                    angle: 0.0,
                    flipped: false,
                },
                Bank(2),
            ));
        }

        update_banks(&mut world, 1.0);

        let velocities: Vec<Vec2> = world
            .query::<(&Velocity, &Bank)>()
            .iter()
            .map(|(_, (v, _))| v.v)
            .collect();
        assert!(velocities.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn sway_is_bounded() {
        let mut world = hecs::World::new();
        let e = world.spawn((Sway {
            phase: 1.3,
            freq: 2.0,
            angle: 0.0,
        },));

        for step in 0..200 {
            sway_plants(&mut world, step as f32 * 0.05);
            let sway = world.get::<&Sway>(e).unwrap();
            assert!(sway.angle.abs() <= SWAY_AMPLITUDE + 1e-6);
        }
    }
}
