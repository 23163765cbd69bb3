/// Asserts that no live agent with the given id exists in any colony.
#[macro_export]
macro_rules! assert_agent_dead {
    ($engine:expr, $id:expr) => {
        let exists = $engine.agents().any(|a| a.id == $id);
        assert!(!exists, "Agent {} should be dead but was found alive", $id);
    };
}

/// Asserts that a live agent with the given id exists.
#[macro_export]
macro_rules! assert_agent_alive {
    ($engine:expr, $id:expr) => {
        let exists = $engine.agents().any(|a| a.id == $id);
        assert!(exists, "Agent {} should be alive but was not found", $id);
    };
}

/// Asserts the total live population over every colony.
#[macro_export]
macro_rules! assert_population {
    ($engine:expr, $count:expr) => {
        assert_eq!($engine.population(), $count, "Population count mismatch");
    };
}

/// Asserts a colony's stock within floating point tolerance.
#[macro_export]
macro_rules! assert_stock {
    ($engine:expr, $colony:expr, $expected:expr) => {
        let colony = $engine
            .colony($colony)
            .expect("Colony not found in engine");
        assert!(
            (colony.stock - $expected).abs() < 1e-9,
            "Colony {} stock {} is not {}",
            $colony,
            colony.stock,
            $expected
        );
    };
}
