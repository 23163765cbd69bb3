use stigmergy_data::{AgentId, ColonyId};

/// Cross-colony effects emitted while a colony updates its roster and
/// applied by the engine once that update has finished.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionCommand {
    Damage {
        target_colony: ColonyId,
        target: AgentId,
        attacker_colony: ColonyId,
        amount: f64,
    },
}

/// Colony-local result of one agent update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentEvent {
    /// Worker took food from a source.
    Harvested(f64),
    /// Worker dropped its load at the nest.
    Delivered(f64),
    /// Agent exceeded its lifespan.
    DiedOfAge,
}
