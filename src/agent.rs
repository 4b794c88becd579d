use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bounds::World;
use crate::geometry::{Vec2, heading_vector, wrap_angle};

/// Closed set of behaviours. The role picks which steering primitives run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Wanderer,
    Avoider,
    Seeker,
    Leader,
    Follower,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: usize,
    pub position: Vec2,
    /// Radians in `(-π, π]`.
    pub heading: f32,
    /// World units per tick.
    pub speed: f32,
    pub role: Role,
}

impl Agent {
    pub fn new(id: usize, position: Vec2, heading: f32, speed: f32, role: Role) -> Self {
        Agent {
            id,
            position,
            heading: wrap_angle(heading),
            speed,
            role,
        }
    }

    pub fn random<R: Rng>(id: usize, world: &World, speed: f32, role: Role, rng: &mut R) -> Self {
        let position = world.random_position(rng);
        let heading = rng.random_range(0.0..TAU);
        Self::new(id, position, heading, speed, role)
    }

    pub fn direction(&self) -> Vec2 {
        heading_vector(self.heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};
    use std::f32::consts::PI;

    #[test]
    fn new_normalizes_heading() {
        let agent = Agent::new(0, Vec2::new(1.0, 1.0), 1.5 * PI, 2.0, Role::Wanderer);
        assert!((agent.heading + 0.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn random_agents_spawn_inside_world() {
        let world = World::default();
        let mut rng = SmallRng::seed_from_u64(11);
        for id in 0..200 {
            let agent = Agent::random(id, &world, 2.0, Role::Seeker, &mut rng);
            assert!(world.contains(agent.position));
            assert!(agent.heading > -PI && agent.heading <= PI);
            assert_eq!(agent.id, id);
        }
    }
}
