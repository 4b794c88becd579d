use rand::{SeedableRng, rngs::SmallRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{Agent, Role};
use crate::bounds::World;
use crate::config::{BehaviorConfig, SimConfig, SteeringParams};
use crate::coverage::CoverageGrid;
use crate::error::ConfigError;
use crate::geometry::{Vec2, heading_vector};
use crate::leader::{LeaderIntent, LeaderMotion};
use crate::neighbors::{NeighborIndex, build_index};
use crate::steering::{Steering, attraction, separation, wander_noise};

/// Everything the input side can change for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// New goal for seekers, `None` keeps the current one.
    pub goal: Option<Vec2>,
    pub leader: LeaderIntent,
}

pub trait InputSource {
    fn poll(&mut self, tick: u64) -> TickInput;
}

impl InputSource for TickInput {
    fn poll(&mut self, _tick: u64) -> TickInput {
        *self
    }
}

/// Consumes a read-only view of the world after every tick.
pub trait Renderer {
    type Error;

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Frame<'a> {
    pub tick: u64,
    pub world: &'a World,
    pub agents: &'a [Agent],
    pub goal: Vec2,
    pub leader: Option<Vec2>,
    pub coverage: Option<&'a CoverageGrid>,
}

pub struct Simulation {
    config: SimConfig,
    agents: Vec<Agent>,
    goal: Vec2,
    leader: Option<usize>,
    coverage: Option<CoverageGrid>,
    index: Box<dyn NeighborIndex>,
    seed: u64,
    tick: u64,
}

impl Simulation {
    /// Validate `config` and spawn its population.
    ///
    /// The leader starts at the world centre; everyone else gets a uniform
    /// position and heading.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed();
        let mut rng = SimConfig::seeded_rng(seed);
        let world = config.world;
        let agents = config
            .population
            .roles()
            .enumerate()
            .map(|(id, role)| {
                let speed = config.behavior.speed(role);
                let mut agent = Agent::random(id, &world, speed, role, &mut rng);
                if role == Role::Leader {
                    agent.position = world.center();
                }
                agent
            })
            .collect();
        Self::assemble(config, agents, seed)
    }

    /// Start from explicitly placed agents instead of spawning `config.population`.
    ///
    /// Agent ids are reassigned to their index.
    pub fn with_agents(config: SimConfig, agents: Vec<Agent>) -> Result<Self, ConfigError> {
        let leaders = agents.iter().filter(|a| a.role == Role::Leader).count();
        if leaders > 1 {
            return Err(ConfigError::MultipleLeaders { count: leaders });
        }
        let followers = agents.iter().filter(|a| a.role == Role::Follower).count();
        if followers > 0 && leaders == 0 {
            return Err(ConfigError::FollowersWithoutLeader { followers });
        }
        config.validate_settings()?;
        let mut agents = agents;
        for (id, agent) in agents.iter_mut().enumerate() {
            if !config.world.contains(agent.position)
                || !agent.heading.is_finite()
                || !(agent.speed.is_finite() && agent.speed >= 0.0)
            {
                return Err(ConfigError::InvalidAgent { id });
            }
            *agent = Agent::new(id, agent.position, agent.heading, agent.speed, agent.role);
        }
        let seed = config.seed();
        Self::assemble(config, agents, seed)
    }

    fn assemble(config: SimConfig, agents: Vec<Agent>, seed: u64) -> Result<Self, ConfigError> {
        let coverage = config
            .coverage
            .map(|c| CoverageGrid::new(config.world.width, config.world.height, c.cell_size))
            .transpose()?;
        let leader = agents.iter().position(|a| a.role == Role::Leader);
        let goal = config.goal.unwrap_or_else(|| config.world.center());
        let index = build_index(config.neighbor_search);
        info!(
            agents = agents.len(),
            seed,
            coverage = coverage.is_some(),
            "simulation ready"
        );
        Ok(Simulation {
            config,
            agents,
            goal,
            leader,
            coverage,
            index,
            seed,
            tick: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn goal(&self) -> Vec2 {
        self.goal
    }

    pub fn leader_position(&self) -> Option<Vec2> {
        self.leader.map(|i| self.agents[i].position)
    }

    pub fn coverage(&self) -> Option<&CoverageGrid> {
        self.coverage.as_ref()
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            tick: self.tick,
            world: &self.config.world,
            agents: &self.agents,
            goal: self.goal,
            leader: self.leader_position(),
            coverage: self.coverage.as_ref(),
        }
    }

    /// Advance one tick. Never blocks and never exposes a half-updated population.
    pub fn step(&mut self, input: &TickInput) {
        if let Some(goal) = input.goal {
            self.goal = goal;
        }

        let positions: Vec<Vec2> = self.agents.iter().map(|a| a.position).collect();
        self.index.rebuild(&positions);

        // Gather every next state from the snapshot, then apply them all at once.
        let next: Vec<Agent> = {
            let snapshot = Snapshot {
                agents: &self.agents,
                index: self.index.as_ref(),
                behavior: &self.config.behavior,
                world: &self.config.world,
                goal: self.goal,
                leader: self.leader.map(|i| self.agents[i].position),
                leader_motion: LeaderMotion::from_intent(
                    &input.leader,
                    &self.config.behavior.leader,
                ),
                seed: self.seed,
                tick: self.tick,
            };
            self.agents
                .par_iter()
                .map(|agent| snapshot.advance(agent))
                .collect()
        };
        self.agents = next;

        if let Some(grid) = self.coverage.as_mut() {
            for agent in &self.agents {
                grid.record(agent.position);
            }
        }
        self.tick += 1;
        debug!(tick = self.tick, goal = ?self.goal, "tick committed");
    }

    /// Run `ticks` ticks, polling `input` before and presenting to `renderer` after each.
    pub fn run<I, R>(&mut self, ticks: u64, input: &mut I, renderer: &mut R) -> Result<(), R::Error>
    where
        I: InputSource,
        R: Renderer,
    {
        for _ in 0..ticks {
            let tick_input = input.poll(self.tick);
            self.step(&tick_input);
            renderer.present(&self.frame())?;
        }
        Ok(())
    }
}

/// Read-only start-of-tick view shared by every per-agent update.
struct Snapshot<'a> {
    agents: &'a [Agent],
    index: &'a dyn NeighborIndex,
    behavior: &'a BehaviorConfig,
    world: &'a World,
    goal: Vec2,
    leader: Option<Vec2>,
    leader_motion: LeaderMotion,
    seed: u64,
    tick: u64,
}

impl Snapshot<'_> {
    fn advance(&self, agent: &Agent) -> Agent {
        let mut speed = agent.speed;
        let (tentative, heading) = match agent.role {
            Role::Leader => {
                speed = self.leader_motion.speed();
                self.leader_motion.apply(agent.position, agent.heading)
            }
            Role::Wanderer => self.wander(agent),
            Role::Avoider => self.avoid(agent),
            Role::Seeker => self.seek(agent),
            Role::Follower => self.follow(agent),
        };
        let (position, heading) = self.world.reflect_and_clamp(tentative, heading);
        Agent {
            position,
            heading,
            speed,
            ..*agent
        }
    }

    fn wander(&self, agent: &Agent) -> (Vec2, f32) {
        let params = &self.behavior.wanderer.steering;
        let steering = self.base(agent, params);
        motion(agent, steering, params.max_turn, agent.speed)
    }

    fn avoid(&self, agent: &Agent) -> (Vec2, f32) {
        let config = &self.behavior.avoider;
        let neighbors = self.neighbors(agent, config.separation.range, |_| true);
        let steering = self
            .base(agent, &config.steering)
            .with(separation(agent.position, neighbors, &config.separation));
        motion(agent, steering, config.steering.max_turn, agent.speed)
    }

    fn seek(&self, agent: &Agent) -> (Vec2, f32) {
        let config = &self.behavior.seeker;
        let steering = self
            .base(agent, &config.steering)
            .with(attraction(agent.position, self.goal, config.attraction));
        let speed = if (self.goal - agent.position).norm() < config.reach_radius {
            agent.speed * config.slow_factor
        } else {
            agent.speed
        };
        motion(agent, steering, config.steering.max_turn, speed)
    }

    fn follow(&self, agent: &Agent) -> (Vec2, f32) {
        let config = &self.behavior.follower;
        let neighbors = self.neighbors(agent, config.separation.range, |role| {
            role == Role::Follower
        });
        let pursuit = self
            .leader
            .map(|leader| attraction(agent.position, leader, config.pursuit))
            .unwrap_or_else(Vec2::zeros);
        let steering = self
            .base(agent, &config.steering)
            .with(separation(agent.position, neighbors, &config.separation))
            .with(pursuit);
        motion(agent, steering, config.steering.max_turn, agent.speed)
    }

    /// Forward plus this tick's noise sample, common to every steered role.
    fn base(&self, agent: &Agent, params: &SteeringParams) -> Steering {
        let mut rng = SmallRng::seed_from_u64(stream_seed(self.seed, self.tick, agent.id));
        Steering::new(agent.heading).with(wander_noise(&mut rng, params.wiggle))
    }

    /// Snapshot positions of other agents within `range` whose role passes `keep`.
    fn neighbors(&self, agent: &Agent, range: f32, keep: impl Fn(Role) -> bool) -> Vec<Vec2> {
        let mut found = Vec::new();
        self.index.for_each_within(agent.position, range, &mut |index| {
            let other = &self.agents[index];
            if index != agent.id && keep(other.role) {
                found.push(other.position);
            }
        });
        found
    }
}

/// Turn-limited heading and the tentative position one step along it.
fn motion(agent: &Agent, steering: Steering, max_turn: f32, speed: f32) -> (Vec2, f32) {
    let heading = steering.resolve(max_turn);
    (agent.position + heading_vector(heading) * speed, heading)
}

/// Independent RNG stream per (run, tick, agent) so the parallel map is deterministic.
fn stream_seed(seed: u64, tick: u64, agent: usize) -> u64 {
    let mut z = seed
        ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (agent as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
