use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique agent identity. Stable for the agent's whole life.
pub type AgentId = Uuid;

/// Closed set of agent roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Worker,
    Army,
}

/// Behaviour state. Which states are reachable depends on the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Worker looking for food.
    Search,
    /// Worker carrying food home.
    Return,
    /// Army wandering near the attack trail or home.
    Patrol,
    /// Army engaging an enemy in sensor range.
    Fight,
}

impl AgentState {
    /// State a freshly spawned agent of `role` starts in.
    #[must_use]
    pub const fn initial(role: Role) -> Self {
        match role {
            Role::Worker => AgentState::Search,
            Role::Army => AgentState::Patrol,
        }
    }

    #[must_use]
    pub const fn is_valid_for(self, role: Role) -> bool {
        matches!(
            (role, self),
            (Role::Worker, AgentState::Search | AgentState::Return)
                | (Role::Army, AgentState::Patrol | AgentState::Fight)
        )
    }
}
