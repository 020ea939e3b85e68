use glam::Vec2;

use crate::ecs::components::{Agent, Bank, Position, Velocity};
use crate::spatial::{AgentSnapshot, SpatialHash};

/// Neighbors closer than this push a fish away.
const AVOID_RADIUS: f32 = 40.0;
const AVOID_RADIUS_SQ: f32 = AVOID_RADIUS * AVOID_RADIUS;
/// Steering gain applied to the averaged repulsion before renormalizing.
const AVOID_GAIN: f32 = 12.0;
/// Below this squared distance two agents are considered coincident and
/// contribute no direction.
const MIN_DIST_SQ: f32 = 1e-6;

/// Pre-allocated per-tick accumulators, indexed by snapshot position.
pub struct FlockBuffers {
    force_sum: Vec<Vec2>,
    force_count: Vec<u32>,
}

impl FlockBuffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            force_sum: vec![Vec2::ZERO; capacity],
            force_count: vec![0; capacity],
        }
    }
}

/// Rebuild the spatial hash and snapshot cache from current positions.
/// Every position-bearing agent is captured (plants repel fish too);
/// only free-swimming fish consume the result.
pub fn rebuild(world: &hecs::World, grid: &mut SpatialHash, snapshots: &mut Vec<AgentSnapshot>) {
    grid.clear();
    snapshots.clear();
    for (entity, (pos, agent, vel, bank)) in world
        .query::<(&Position, &Agent, Option<&Velocity>, Option<&Bank>)>()
        .iter()
    {
        let idx = snapshots.len() as u32;
        snapshots.push(AgentSnapshot {
            entity,
            pos: pos.0,
            vel: vel.map(|v| v.v).unwrap_or(Vec2::ZERO),
            speed: vel.map(|v| v.speed).unwrap_or(0.0),
            species: agent.species,
            banked: bank.is_some(),
            disabled: vel.map(|v| v.disabled).unwrap_or(false),
        });
        grid.insert(pos.0, idx);
    }
}

/// Local avoidance for free-swimming fish. For every neighbor inside
/// AVOID_RADIUS a repulsion is accumulated, weighted linearly from 1 at
/// contact down to 0 at the radius; the sum is averaged over the number
/// of contributors so dense crowds do not blow up, scaled, added to the
/// velocity, and the velocity is renormalized back to the fish's fixed
/// speed. Steering changes direction only, never net speed.
pub fn steer(
    world: &mut hecs::World,
    snapshots: &[AgentSnapshot],
    grid: &SpatialHash,
    bufs: &mut FlockBuffers,
) {
    let len = snapshots.len();
    bufs.force_sum.resize(len, Vec2::ZERO);
    bufs.force_count.resize(len, 0);
    for i in 0..len {
        bufs.force_sum[i] = Vec2::ZERO;
        bufs.force_count[i] = 0;
    }

    // Read pass over snapshots only; no world borrow, order-independent.
    for (my_idx, me) in snapshots.iter().enumerate() {
        if !me.species.is_fish() || me.banked || me.disabled {
            continue;
        }
        // A speed-zero fish cannot be renormalized; leave it alone.
        if me.speed <= f32::EPSILON {
            continue;
        }

        grid.query_neighbors(me.pos, |neighbor_idx| {
            let ni = neighbor_idx as usize;
            if ni == my_idx || ni >= len {
                return;
            }
            let them = &snapshots[ni];
            let delta = me.pos - them.pos;
            let dist_sq = delta.length_squared();
            if dist_sq >= AVOID_RADIUS_SQ || dist_sq < MIN_DIST_SQ {
                return;
            }
            let dist = dist_sq.sqrt();
            let falloff = 1.0 - dist / AVOID_RADIUS;
            bufs.force_sum[my_idx] += delta / dist * falloff;
            bufs.force_count[my_idx] += 1;
        });
    }

    // Write pass: steer and renormalize.
    for (idx, snap) in snapshots.iter().enumerate() {
        if bufs.force_count[idx] == 0 {
            continue;
        }
        let avg = bufs.force_sum[idx] / bufs.force_count[idx] as f32;
        if let Ok(mut vel) = world.get::<&mut Velocity>(snap.entity) {
            vel.v += avg * AVOID_GAIN;
            let length = vel.v.length();
            if length > f32::EPSILON {
                vel.v = vel.v / length * vel.speed;
            }
        }
    }
}
