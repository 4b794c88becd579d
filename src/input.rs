//! Deterministic stand-in for a human at the keyboard and mouse.

use rand::{Rng, rngs::SmallRng};

use crate::bounds::World;
use crate::config::SimConfig;
use crate::leader::LeaderIntent;
use crate::sim::{InputSource, TickInput};

/// Replays seeded "clicks" on new goals and leader key presses.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    world: World,
    rng: SmallRng,
    /// Ticks between goal clicks; 0 never clicks.
    pub goal_interval: u64,
    /// Ticks a set of direction keys stays held.
    pub hold_ticks: u64,
    /// Chance per tick that the dash key is tapped.
    pub dash_chance: f64,
    held: LeaderIntent,
}

impl ScriptedInput {
    pub fn new(world: World, seed: u64) -> Self {
        ScriptedInput {
            world,
            rng: SimConfig::seeded_rng(seed),
            goal_interval: 240,
            hold_ticks: 45,
            dash_chance: 0.02,
            held: LeaderIntent::default(),
        }
    }

    fn press_random_keys(&mut self) -> LeaderIntent {
        // One in four holds leave the keys up so the leader glides.
        if self.rng.random_bool(0.25) {
            return LeaderIntent::default();
        }
        LeaderIntent {
            up: self.rng.random_bool(0.4),
            down: self.rng.random_bool(0.4),
            left: self.rng.random_bool(0.4),
            right: self.rng.random_bool(0.4),
            dash: false,
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> TickInput {
        let goal = (self.goal_interval > 0 && tick > 0 && tick % self.goal_interval == 0)
            .then(|| self.world.random_position(&mut self.rng));
        if self.hold_ticks > 0 && tick % self.hold_ticks == 0 {
            self.held = self.press_random_keys();
        }
        let dash = self.dash_chance > 0.0 && self.rng.random_bool(self.dash_chance.min(1.0));
        TickInput {
            goal,
            leader: LeaderIntent { dash, ..self.held },
        }
    }
}
