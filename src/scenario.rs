use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bounds::World;
use crate::config::{CoverageConfig, NeighborSearch, Population, SimConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    Wander,
    /// Wanderers painting a coverage heatmap.
    Coverage,
    Avoidance,
    GoalSeek,
    /// A keyboard-driven leader chased by followers.
    LeaderChase,
    /// Every role at once, with coverage.
    Mixed,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Wander,
        Scenario::Coverage,
        Scenario::Avoidance,
        Scenario::GoalSeek,
        Scenario::LeaderChase,
        Scenario::Mixed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Wander => "wander",
            Scenario::Coverage => "coverage",
            Scenario::Avoidance => "avoidance",
            Scenario::GoalSeek => "goal-seek",
            Scenario::LeaderChase => "leader-chase",
            Scenario::Mixed => "mixed",
        }
    }

    pub fn config(self) -> SimConfig {
        let base = SimConfig::default();
        match self {
            Scenario::Wander => SimConfig {
                world: World {
                    agent_radius: 5.0,
                    ..World::default()
                },
                population: Population {
                    wanderers: 15,
                    ..Population::default()
                },
                ..base
            },
            Scenario::Coverage => SimConfig {
                world: World {
                    agent_radius: 5.0,
                    ..World::default()
                },
                population: Population {
                    wanderers: 20,
                    ..Population::default()
                },
                coverage: Some(CoverageConfig { cell_size: 10.0 }),
                ..base
            },
            Scenario::Avoidance => SimConfig {
                population: Population {
                    avoiders: 25,
                    ..Population::default()
                },
                ..base
            },
            Scenario::GoalSeek => SimConfig {
                population: Population {
                    seekers: 25,
                    ..Population::default()
                },
                ..base
            },
            Scenario::LeaderChase => SimConfig {
                world: World {
                    width: 900.0,
                    ..World::default()
                },
                population: Population {
                    followers: 22,
                    leader: true,
                    ..Population::default()
                },
                ..base
            },
            Scenario::Mixed => SimConfig {
                world: World {
                    width: 1200.0,
                    height: 800.0,
                    ..World::default()
                },
                population: Population {
                    wanderers: 10,
                    avoiders: 20,
                    seekers: 15,
                    followers: 20,
                    leader: true,
                },
                coverage: Some(CoverageConfig::default()),
                neighbor_search: NeighborSearch::Grid { cell_size: 40.0 },
                ..base
            },
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Scenario::ALL.iter().map(|s| s.name()).collect();
                format!("unknown scenario `{s}`, expected one of: {}", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_is_valid() {
        for scenario in Scenario::ALL {
            scenario
                .config()
                .validate()
                .unwrap_or_else(|e| panic!("{scenario}: {e}"));
        }
    }

    #[test]
    fn names_parse_back() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>(), Ok(scenario));
        }
        assert!("flocking".parse::<Scenario>().is_err());
    }

    #[test]
    fn only_heatmap_scenarios_track_coverage() {
        assert!(Scenario::Coverage.config().coverage.is_some());
        assert!(Scenario::Avoidance.config().coverage.is_none());
    }
}
