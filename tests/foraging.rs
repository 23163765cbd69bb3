mod common;

use common::{AgentBuilder, EngineBuilder};
use proptest::prelude::*;
use stigmergy_lib::model::agent::AgentState;
use stigmergy_lib::model::colony::ColonyId;
use stigmergy_lib::model::pheromone::Channel;

#[test]
fn test_forage_and_return_round_trip() {
    let (mut engine, ids) = EngineBuilder::new()
        .with_food(150.0, 75.0, 20.0, 100.0)
        .with_agent(
            AgentBuilder::worker(0)
                .at(150.0, 75.0)
                .speed(0.0)
                .capacity(5.0),
        )
        .build();
    let worker = ids[0];

    engine.tick();
    {
        let colony = engine.colony(ColonyId(0)).expect("colony 0");
        let agent = colony.agent(worker).expect("worker alive");
        assert_eq!(agent.state, AgentState::Return);
        assert!((agent.carried - 5.0).abs() < 1e-9);
        assert!((engine.foods()[0].amount - 95.0).abs() < 1e-9);
        assert_stock!(engine, ColonyId(0), 0.0);
    }

    let home = engine.colony(ColonyId(0)).expect("colony 0").home;
    engine
        .colony_mut(ColonyId(0))
        .expect("colony 0")
        .agent_mut(worker)
        .expect("worker alive")
        .position = home;
    engine.tick();

    let colony = engine.colony(ColonyId(0)).expect("colony 0");
    let agent = colony.agent(worker).expect("worker alive");
    assert_eq!(agent.state, AgentState::Search);
    assert_eq!(agent.carried, 0.0);
    assert_stock!(engine, ColonyId(0), 5.0);
    assert!((colony.stats.delivered - 5.0).abs() < 1e-9);
}

#[test]
fn test_returning_worker_lays_harvest_trail() {
    let (mut engine, _) = EngineBuilder::new()
        .with_agent(
            AgentBuilder::worker(0)
                .at(200.0, 75.0)
                .speed(0.0)
                .carrying(0.5)
                .state(AgentState::Return),
        )
        .build();
    engine.tick();

    let colony = engine.colony(ColonyId(0)).expect("colony 0");
    assert!(colony.field.total(Channel::Harvest) > 0.0);
}

#[test]
fn test_searching_workers_find_food() {
    let mut builder = EngineBuilder::new()
        .with_seed(17)
        .with_food(120.0, 120.0, 30.0, 200.0)
        .with_food(40.0, 160.0, 30.0, 200.0)
        .with_food(160.0, 40.0, 30.0, 200.0)
        .with_food(250.0, 80.0, 30.0, 200.0);
    for _ in 0..20 {
        builder = builder.with_agent(AgentBuilder::worker(0));
    }
    let (mut engine, _) = builder.build();

    engine.run(3000);

    let colony = engine.colony(ColonyId(0)).expect("colony 0");
    assert!(colony.stats.harvested > 0.0, "no worker ever reached food");
    for agent in &colony.agents {
        assert!(agent.carried <= agent.capacity + 1e-9);
    }
}

prop_compose! {
    fn arb_load()(
        capacity in 0.1f64..20.0,
        amount in 0.5f64..50.0,
        trips in 1usize..12,
    ) -> (f64, f64, usize) {
        (capacity, amount, trips)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_load_never_exceeds_capacity((capacity, amount, trips) in arb_load()) {
        let (mut engine, ids) = EngineBuilder::new()
            .with_config(|c| c.food.respawn_delay = u64::MAX)
            .with_food(150.0, 75.0, 20.0, amount)
            .with_agent(
                AgentBuilder::worker(0)
                    .at(150.0, 75.0)
                    .speed(0.0)
                    .capacity(capacity),
            )
            .build();
        let worker = ids[0];
        let food_at = engine.foods()[0].position;
        let (home, opening_stock) = {
            let colony = engine.colony(ColonyId(0)).expect("colony 0");
            (colony.home, colony.stock)
        };

        for trip in 0..trips * 2 {
            let target = if trip % 2 == 0 { food_at } else { home };
            engine
                .colony_mut(ColonyId(0))
                .expect("colony 0")
                .agent_mut(worker)
                .expect("worker alive")
                .position = target;
            engine.tick();

            let colony = engine.colony(ColonyId(0)).expect("colony 0");
            let agent = colony.agent(worker).expect("worker alive");
            let remaining = engine.foods()[0].amount;
            prop_assert!(
                agent.carried <= agent.capacity + 1e-9,
                "carried {} over capacity {}",
                agent.carried,
                agent.capacity
            );
            prop_assert!(remaining >= 0.0);
            let accounted = colony.stock + remaining + agent.carried;
            prop_assert!((accounted - opening_stock - amount).abs() < 1e-6);
        }
    }
}
