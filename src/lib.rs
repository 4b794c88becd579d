//! Kinematic 2D swarm simulator.
//!
//! Agents wander, keep apart, chase a goal or follow a keyboard-driven
//! leader. Each tick every agent blends a few steering contributions into a
//! turn-limited heading, moves, and bounces off the world walls.

pub mod agent;
pub mod bounds;
pub mod config;
pub mod coverage;
pub mod error;
pub mod geometry;
pub mod input;
pub mod leader;
pub mod neighbors;
pub mod render;
pub mod scenario;
pub mod sim;
pub mod steering;

pub use agent::{Agent, Role};
pub use bounds::World;
pub use config::{BehaviorConfig, CoverageConfig, NeighborSearch, Population, SimConfig};
pub use coverage::{Cell, CoverageGrid};
pub use error::ConfigError;
pub use geometry::Vec2;
pub use leader::LeaderIntent;
pub use scenario::Scenario;
pub use sim::{Frame, InputSource, Renderer, Simulation, TickInput};
