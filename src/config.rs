use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agent::Role;
use crate::bounds::World;
use crate::coverage::CoverageGrid;
use crate::error::ConfigError;
use crate::geometry::Vec2;
use crate::neighbors::MAX_GRID_SPAN;

/// Parameters shared by every composer-driven role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringParams {
    pub speed: f32,
    /// Maximum heading change per tick, radians.
    pub max_turn: f32,
    /// Per-axis noise amplitude added to the summed direction.
    pub wiggle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparationParams {
    pub range: f32,
    pub strength: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WandererConfig {
    pub steering: SteeringParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvoiderConfig {
    pub steering: SteeringParams,
    pub separation: SeparationParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeekerConfig {
    pub steering: SteeringParams,
    pub attraction: f32,
    /// Within this distance of the goal the seeker slows down.
    pub reach_radius: f32,
    pub slow_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaderConfig {
    pub speed: f32,
    pub dash_multiplier: f32,
    /// Distance covered per tick when no direction is held.
    pub glide_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowerConfig {
    pub steering: SteeringParams,
    pub separation: SeparationParams,
    pub pursuit: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub wanderer: WandererConfig,
    pub avoider: AvoiderConfig,
    pub seeker: SeekerConfig,
    pub leader: LeaderConfig,
    pub follower: FollowerConfig,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            wanderer: WandererConfig {
                steering: SteeringParams {
                    speed: 2.0,
                    max_turn: 0.3,
                    wiggle: 0.3,
                },
            },
            avoider: AvoiderConfig {
                steering: SteeringParams {
                    speed: 2.2,
                    max_turn: 0.25,
                    wiggle: 0.1,
                },
                separation: SeparationParams {
                    range: 40.0,
                    strength: 0.9,
                },
            },
            seeker: SeekerConfig {
                steering: SteeringParams {
                    speed: 2.2,
                    max_turn: 0.25,
                    wiggle: 0.06,
                },
                attraction: 0.10,
                reach_radius: 20.0,
                slow_factor: 0.4,
            },
            leader: LeaderConfig {
                speed: 3.0,
                dash_multiplier: 1.8,
                glide_speed: 0.6,
            },
            follower: FollowerConfig {
                steering: SteeringParams {
                    speed: 2.5,
                    max_turn: 0.28,
                    wiggle: 0.06,
                },
                separation: SeparationParams {
                    range: 38.0,
                    strength: 0.8,
                },
                pursuit: 0.18,
            },
        }
    }
}

impl BehaviorConfig {
    pub fn speed(&self, role: Role) -> f32 {
        match role {
            Role::Wanderer => self.wanderer.steering.speed,
            Role::Avoider => self.avoider.steering.speed,
            Role::Seeker => self.seeker.steering.speed,
            Role::Leader => self.leader.speed,
            Role::Follower => self.follower.steering.speed,
        }
    }

    pub fn max_separation_range(&self) -> f32 {
        self.avoider.separation.range.max(self.follower.separation.range)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_steering(Role::Wanderer, &self.wanderer.steering)?;

        check_steering(Role::Avoider, &self.avoider.steering)?;
        check_separation(Role::Avoider, &self.avoider.separation)?;

        let seeker = &self.seeker;
        check_steering(Role::Seeker, &seeker.steering)?;
        non_negative(Role::Seeker, "attraction", seeker.attraction)?;
        non_negative(Role::Seeker, "reach_radius", seeker.reach_radius)?;
        if !(0.0..=1.0).contains(&seeker.slow_factor) {
            return Err(invalid(Role::Seeker, "slow_factor", seeker.slow_factor));
        }

        let leader = &self.leader;
        non_negative(Role::Leader, "speed", leader.speed)?;
        non_negative(Role::Leader, "dash_multiplier", leader.dash_multiplier)?;
        non_negative(Role::Leader, "glide_speed", leader.glide_speed)?;

        check_steering(Role::Follower, &self.follower.steering)?;
        check_separation(Role::Follower, &self.follower.separation)?;
        non_negative(Role::Follower, "pursuit", self.follower.pursuit)?;
        Ok(())
    }
}

fn invalid(role: Role, field: &'static str, value: f32) -> ConfigError {
    ConfigError::InvalidParameter { role, field, value }
}

fn non_negative(role: Role, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(role, field, value))
    }
}

fn check_steering(role: Role, params: &SteeringParams) -> Result<(), ConfigError> {
    non_negative(role, "speed", params.speed)?;
    non_negative(role, "max_turn", params.max_turn)?;
    non_negative(role, "wiggle", params.wiggle)
}

fn check_separation(role: Role, params: &SeparationParams) -> Result<(), ConfigError> {
    if !(params.range.is_finite() && params.range > 0.0) {
        return Err(invalid(role, "separation.range", params.range));
    }
    non_negative(role, "separation.strength", params.strength)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Population {
    pub wanderers: usize,
    pub avoiders: usize,
    pub seekers: usize,
    pub followers: usize,
    /// At most one leader exists.
    pub leader: bool,
}

impl Population {
    pub fn total(&self) -> usize {
        self.wanderers + self.avoiders + self.seekers + self.followers + usize::from(self.leader)
    }

    /// Roles in spawn order: leader first, then wanderers, avoiders, seekers, followers.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        let leader = self.leader.then_some(Role::Leader);
        leader
            .into_iter()
            .chain(std::iter::repeat_n(Role::Wanderer, self.wanderers))
            .chain(std::iter::repeat_n(Role::Avoider, self.avoiders))
            .chain(std::iter::repeat_n(Role::Seeker, self.seekers))
            .chain(std::iter::repeat_n(Role::Follower, self.followers))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageConfig {
    pub cell_size: f32,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self { cell_size: 10.0 }
    }
}

/// Strategy used to find separation neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum NeighborSearch {
    /// Check every agent against every other, O(n²) per tick.
    #[default]
    BruteForce,
    /// Bucket agents into square cells and only scan nearby cells.
    Grid { cell_size: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: World,
    pub population: Population,
    pub behavior: BehaviorConfig,
    /// Starting goal for seekers; the world centre when absent.
    pub goal: Option<Vec2>,
    /// Coverage tracking is off when absent.
    pub coverage: Option<CoverageConfig>,
    pub neighbor_search: NeighborSearch,
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world: World::default(),
            population: Population::default(),
            behavior: BehaviorConfig::default(),
            goal: None,
            coverage: None,
            neighbor_search: NeighborSearch::default(),
            rng_seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_settings()?;
        if self.population.followers > 0 && !self.population.leader {
            return Err(ConfigError::FollowersWithoutLeader {
                followers: self.population.followers,
            });
        }
        if self.population.total() == 0 {
            warn!("simulation configured with an empty population");
        }
        Ok(())
    }

    /// Everything except the population, for runs that place agents explicitly.
    pub fn validate_settings(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.behavior.validate()?;
        if let Some(coverage) = &self.coverage {
            CoverageGrid::dimensions(self.world.width, self.world.height, coverage.cell_size)?;
        }
        if let NeighborSearch::Grid { cell_size } = self.neighbor_search {
            if !(cell_size.is_finite() && cell_size > 0.0) {
                return Err(ConfigError::InvalidNeighborSearch(
                    "grid cell_size must be positive",
                ));
            }
            if cell_size * MAX_GRID_SPAN < self.behavior.max_separation_range() {
                return Err(ConfigError::InvalidNeighborSearch(
                    "grid cell_size too small for the separation range",
                ));
            }
        }
        if let Some(goal) = self.goal {
            if !(goal.x.is_finite() && goal.y.is_finite()) {
                return Err(ConfigError::InvalidWorld("goal must be finite"));
            }
        }
        Ok(())
    }

    /// Returns the configured RNG seed, generating one from entropy if absent.
    pub fn seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(rand::random)
    }

    pub fn seeded_rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimConfig::default().validate().unwrap();
        BehaviorConfig::default().validate().unwrap();
    }

    #[test]
    fn followers_need_a_leader() {
        let config = SimConfig {
            population: Population {
                followers: 3,
                ..Population::default()
            },
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::FollowersWithoutLeader { followers: 3 })
        );
    }

    #[test]
    fn rejects_negative_turn_rate() {
        let mut behavior = BehaviorConfig::default();
        behavior.avoider.steering.max_turn = -0.1;
        let err = behavior.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                role: Role::Avoider,
                field: "max_turn",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_separation_range() {
        let mut behavior = BehaviorConfig::default();
        behavior.follower.separation.range = 0.0;
        assert!(behavior.validate().is_err());
    }

    #[test]
    fn rejects_slow_factor_above_one() {
        let mut behavior = BehaviorConfig::default();
        behavior.seeker.slow_factor = 1.5;
        assert!(behavior.validate().is_err());
    }

    #[test]
    fn rejects_bad_coverage_and_grid() {
        let config = SimConfig {
            coverage: Some(CoverageConfig { cell_size: 0.0 }),
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCoverage(_))
        ));

        let config = SimConfig {
            neighbor_search: NeighborSearch::Grid { cell_size: -4.0 },
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNeighborSearch(_))
        ));
    }

    #[test]
    fn rejects_cells_too_small_to_use() {
        let config = SimConfig {
            coverage: Some(CoverageConfig { cell_size: 1e-7 }),
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCoverage(_))
        ));

        let config = SimConfig {
            neighbor_search: NeighborSearch::Grid { cell_size: 1e-9 },
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNeighborSearch(_))
        ));

        // 40 / 32 = 1.25 is the smallest grid cell the default ranges allow.
        let config = SimConfig {
            neighbor_search: NeighborSearch::Grid { cell_size: 1.25 },
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn spawn_order_puts_leader_first() {
        let population = Population {
            wanderers: 1,
            avoiders: 0,
            seekers: 2,
            followers: 1,
            leader: true,
        };
        let roles: Vec<Role> = population.roles().collect();
        assert_eq!(
            roles,
            vec![
                Role::Leader,
                Role::Wanderer,
                Role::Seeker,
                Role::Seeker,
                Role::Follower
            ]
        );
        assert_eq!(population.total(), 5);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SimConfig {
            coverage: Some(CoverageConfig::default()),
            neighbor_search: NeighborSearch::Grid { cell_size: 40.0 },
            rng_seed: Some(9),
            ..SimConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
