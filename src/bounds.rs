use std::f32::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Vec2, wrap_angle};

/// Static world rectangle. Agent centres live in
/// `[agent_radius, width - agent_radius] × [agent_radius, height - agent_radius]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub agent_radius: f32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            agent_radius: 6.0,
        }
    }
}

impl World {
    pub fn new(width: f32, height: f32, agent_radius: f32) -> Result<Self, ConfigError> {
        let world = Self {
            width,
            height,
            agent_radius,
        };
        world.validate()?;
        Ok(world)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(ConfigError::InvalidWorld("width must be positive"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ConfigError::InvalidWorld("height must be positive"));
        }
        if !(self.agent_radius.is_finite() && self.agent_radius > 0.0) {
            return Err(ConfigError::InvalidWorld("agent_radius must be positive"));
        }
        if 2.0 * self.agent_radius >= self.width.min(self.height) {
            return Err(ConfigError::InvalidWorld(
                "agent_radius leaves no room inside the world",
            ));
        }
        Ok(())
    }

    pub fn min_x(&self) -> f32 {
        self.agent_radius
    }

    pub fn max_x(&self) -> f32 {
        self.width - self.agent_radius
    }

    pub fn min_y(&self) -> f32 {
        self.agent_radius
    }

    pub fn max_y(&self) -> f32 {
        self.height - self.agent_radius
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, position: Vec2) -> bool {
        (self.min_x()..=self.max_x()).contains(&position.x)
            && (self.min_y()..=self.max_y()).contains(&position.y)
    }

    pub fn random_position<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.random_range(self.min_x()..=self.max_x()),
            rng.random_range(self.min_y()..=self.max_y()),
        )
    }

    /// Bounce a tentative move off the walls.
    ///
    /// Touching a vertical wall mirrors the heading to `π - θ`, touching a
    /// horizontal wall mirrors it to `-θ`. In a corner both fire, x first.
    /// The position is then clamped back inside rather than re-projected
    /// along the reflected path, so an agent can sit on the wall for a tick.
    pub fn reflect_and_clamp(&self, tentative: Vec2, heading: f32) -> (Vec2, f32) {
        let mut heading = heading;
        if tentative.x <= self.min_x() || tentative.x >= self.max_x() {
            heading = PI - heading;
        }
        if tentative.y <= self.min_y() || tentative.y >= self.max_y() {
            heading = -heading;
        }
        let position = Vec2::new(
            tentative.x.clamp(self.min_x(), self.max_x()),
            tentative.y.clamp(self.min_y(), self.max_y()),
        );
        (position, wrap_angle(heading))
    }
}
