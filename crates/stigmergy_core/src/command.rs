use stigmergy_data::{ColonyId, Role, UpgradeKind};

/// Discrete requests from outside the simulation. Queued by
/// [`Engine::submit`](crate::engine::Engine::submit) and applied at the start
/// of the next tick, in submission order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Spawn { colony: ColonyId, role: Role },
    Upgrade { colony: ColonyId, kind: UpgradeKind },
    /// Clamped to the configured evaporation range.
    SetEvaporationRate(f32),
    /// Clamped to the configured follow range.
    SetFollowStrength(f64),
}

impl Command {
    /// Colony the command addresses, if any.
    #[must_use]
    pub fn colony(&self) -> Option<ColonyId> {
        match self {
            Command::Spawn { colony, .. } | Command::Upgrade { colony, .. } => Some(*colony),
            Command::SetEvaporationRate(_) | Command::SetFollowStrength(_) => None,
        }
    }
}
