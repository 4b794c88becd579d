use serde::{Deserialize, Serialize};

use crate::config::LeaderConfig;
use crate::geometry::{Vec2, heading_vector};

/// Direction keys held this tick plus a one-shot dash.
///
/// Screen coordinates: `up` moves toward smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaderIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub dash: bool,
}

impl LeaderIntent {
    /// Net input direction, `None` when no key is held or opposing keys cancel.
    pub fn direction(&self) -> Option<f32> {
        let ax = i8::from(self.right) - i8::from(self.left);
        let ay = i8::from(self.down) - i8::from(self.up);
        if ax == 0 && ay == 0 {
            return None;
        }
        Some(f32::from(ay).atan2(f32::from(ax)))
    }
}

/// How the leader moves this tick. Chosen fresh every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeaderMotion {
    /// A direction is held: face it exactly and move at full (or dash) speed.
    Directed { heading: f32, speed: f32 },
    /// Nothing held: keep the heading and coast at glide speed.
    Glide { speed: f32 },
}

impl LeaderMotion {
    pub fn from_intent(intent: &LeaderIntent, config: &LeaderConfig) -> Self {
        match intent.direction() {
            Some(heading) => {
                let multiplier = if intent.dash {
                    config.dash_multiplier
                } else {
                    1.0
                };
                LeaderMotion::Directed {
                    heading,
                    speed: config.speed * multiplier,
                }
            }
            None => LeaderMotion::Glide {
                speed: config.glide_speed,
            },
        }
    }

    pub fn speed(&self) -> f32 {
        match *self {
            LeaderMotion::Directed { speed, .. } | LeaderMotion::Glide { speed } => speed,
        }
    }

    /// Heading and tentative position before the wall bounce.
    pub fn apply(&self, position: Vec2, heading: f32) -> (Vec2, f32) {
        let heading = match *self {
            LeaderMotion::Directed { heading, .. } => heading,
            LeaderMotion::Glide { .. } => heading,
        };
        (position + heading_vector(heading) * self.speed(), heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn config() -> LeaderConfig {
        LeaderConfig {
            speed: 3.0,
            dash_multiplier: 1.8,
            glide_speed: 0.6,
        }
    }

    #[test]
    fn single_keys_map_to_axes() {
        let right = LeaderIntent {
            right: true,
            ..Default::default()
        };
        assert_eq!(right.direction(), Some(0.0));
        let up = LeaderIntent {
            up: true,
            ..Default::default()
        };
        assert_eq!(up.direction(), Some(-FRAC_PI_2));
        let left = LeaderIntent {
            left: true,
            ..Default::default()
        };
        assert_eq!(left.direction(), Some(PI));
    }

    #[test]
    fn diagonals_and_cancellation() {
        let down_right = LeaderIntent {
            down: true,
            right: true,
            ..Default::default()
        };
        assert!((down_right.direction().unwrap() - FRAC_PI_4).abs() < 1e-6);
        let opposed = LeaderIntent {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(opposed.direction(), None);
    }

    #[test]
    fn dash_multiplies_directed_speed() {
        let intent = LeaderIntent {
            right: true,
            dash: true,
            ..Default::default()
        };
        let motion = LeaderMotion::from_intent(&intent, &config());
        let (position, heading) = motion.apply(Vec2::new(100.0, 100.0), 2.0);
        assert_eq!(heading, 0.0);
        assert_eq!(motion.speed(), 3.0 * 1.8);
        assert!((position.x - (100.0 + 3.0 * 1.8)).abs() < 1e-4);
        assert!((position.y - 100.0).abs() < 1e-6);
    }

    #[test]
    fn glide_keeps_heading_and_ignores_dash() {
        let intent = LeaderIntent {
            dash: true,
            ..Default::default()
        };
        let motion = LeaderMotion::from_intent(&intent, &config());
        assert_eq!(motion, LeaderMotion::Glide { speed: 0.6 });
        let (position, heading) = motion.apply(Vec2::new(100.0, 100.0), 0.0);
        assert_eq!(heading, 0.0);
        assert_eq!(position, Vec2::new(100.0 + 0.6, 100.0));
    }
}
