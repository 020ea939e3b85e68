pub mod flocking;
pub mod interaction;
pub mod movement;

use flocking::FlockBuffers;

use crate::spatial::{AgentSnapshot, SpatialHash};

/// Run the per-tick simulation systems in fixed order. Interaction
/// resolution happens after this, in the session, so an answer resolved
/// this tick is observed by the next tick's movement pass.
pub fn tick(
    world: &mut hecs::World,
    dt: f32,
    elapsed: f32,
    grid: &mut SpatialHash,
    snapshots: &mut Vec<AgentSnapshot>,
    flock_bufs: &mut FlockBuffers,
) {
    // 1. Snapshot current positions (avoidance must not see this tick's
    //    position writes)
    flocking::rebuild(world, grid, snapshots);

    // 2. Local-avoidance steering (direction only, speed preserved)
    flocking::steer(world, snapshots, grid, flock_bufs);

    // 3. Integrate positions, reflect at bounds, update facing
    movement::integrate(world, dt);

    // 4. Synchronized reversal for fish banks
    movement::update_banks(world, dt);

    // 5. Plant sway (visual lean, time-driven)
    movement::sway_plants(world, elapsed);
}
