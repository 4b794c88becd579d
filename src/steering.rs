use rand::Rng;

use crate::config::SeparationParams;
use crate::geometry::{EPSILON, Vec2, heading_vector, wrap_angle};

pub fn forward(heading: f32) -> Vec2 {
    heading_vector(heading)
}

/// Push away from every neighbor closer than `params.range`.
///
/// A neighbor at distance `d` contributes
/// `(self - other) / d * (range - d) / range * strength`. Neighbors within
/// [`EPSILON`] are coincident and contribute nothing.
pub fn separation<I>(position: Vec2, neighbors: I, params: &SeparationParams) -> Vec2
where
    I: IntoIterator<Item = Vec2>,
{
    let mut push = Vec2::zeros();
    for other in neighbors {
        let offset = position - other;
        let distance = offset.norm();
        if distance > EPSILON && distance < params.range {
            let falloff = (params.range - distance) / params.range;
            push += offset / distance * falloff * params.strength;
        }
    }
    push
}

/// Unit pull toward `target` scaled by `weight`; zero when already there.
pub fn attraction(position: Vec2, target: Vec2, weight: f32) -> Vec2 {
    let offset = target - position;
    let distance = offset.norm();
    if distance < EPSILON {
        return Vec2::zeros();
    }
    offset / distance * weight
}

pub fn wander_noise<R: Rng>(rng: &mut R, amplitude: f32) -> Vec2 {
    if amplitude <= 0.0 {
        return Vec2::zeros();
    }
    Vec2::new(
        rng.random_range(-amplitude..=amplitude),
        rng.random_range(-amplitude..=amplitude),
    )
}

/// Turn from `current` toward `desired` by at most `max_turn` radians.
pub fn limit_turn(current: f32, desired: f32, max_turn: f32) -> f32 {
    let delta = wrap_angle(desired - current).clamp(-max_turn, max_turn);
    wrap_angle(current + delta)
}

/// Running sum of steering contributions for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    heading: f32,
    sum: Vec2,
}

impl Steering {
    pub fn new(heading: f32) -> Self {
        Steering {
            heading,
            sum: forward(heading),
        }
    }

    pub fn with(mut self, contribution: Vec2) -> Self {
        self.sum += contribution;
        self
    }

    /// Angle of the summed direction. A cancelled-out sum keeps the current heading.
    pub fn desired_heading(&self) -> f32 {
        if self.sum.norm_squared() < EPSILON * EPSILON {
            return self.heading;
        }
        self.sum.y.atan2(self.sum.x)
    }

    pub fn resolve(&self, max_turn: f32) -> f32 {
        limit_turn(self.heading, self.desired_heading(), max_turn)
    }
}
