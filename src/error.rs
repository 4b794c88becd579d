use thiserror::Error;

use crate::agent::Role;

/// Rejections raised while validating a [`SimConfig`](crate::config::SimConfig).
///
/// Every variant is reported before the first tick runs; a running simulation
/// never produces one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// World dimensions or agent radius cannot bound any agent.
    #[error("invalid world: {0}")]
    InvalidWorld(&'static str),
    /// A per-role tunable is out of range.
    #[error("invalid {role:?} parameter `{field}`: {value}")]
    InvalidParameter {
        role: Role,
        field: &'static str,
        value: f32,
    },
    #[error("{followers} followers configured without a leader")]
    FollowersWithoutLeader { followers: usize },
    /// More than one leader among explicitly placed agents.
    #[error("{count} leaders placed, at most one is allowed")]
    MultipleLeaders { count: usize },
    /// An explicitly placed agent starts outside the legal area or with a bad heading.
    #[error("agent {id} has an invalid starting state")]
    InvalidAgent { id: usize },
    #[error("invalid coverage grid: {0}")]
    InvalidCoverage(&'static str),
    #[error("invalid neighbor search: {0}")]
    InvalidNeighborSearch(&'static str),
}
