mod common;

use common::{AgentBuilder, EngineBuilder};
use stigmergy_lib::model::agent::AgentState;
use stigmergy_lib::model::colony::ColonyId;
use stigmergy_lib::model::config::EnemyIndexKind;
use stigmergy_lib::model::geometry::Position;
use stigmergy_lib::model::pheromone::Channel;

#[test]
fn test_lethal_hit_removes_target_after_cleanup() {
    let (mut engine, ids) = EngineBuilder::new()
        .with_agent(AgentBuilder::army(0).at(150.0, 150.0))
        .with_agent(AgentBuilder::worker(1).at(152.0, 150.0).speed(0.0).health(1.0))
        .build();
    let victim = ids[1];

    engine.tick();

    assert_agent_dead!(engine, victim);
    assert_population!(engine, 1);
    let attacker = engine.colony(ColonyId(0)).expect("colony 0");
    assert_eq!(attacker.stats.kills, 1);
    assert!(attacker.field.sample(Channel::Attack, Position::new(150.0, 150.0)) > 0.0);
}

#[test]
fn test_survivor_marks_danger() {
    let (mut engine, ids) = EngineBuilder::new()
        .with_agent(AgentBuilder::army(0).at(150.0, 150.0).speed(0.0))
        .with_agent(AgentBuilder::worker(1).at(151.0, 150.0).speed(0.0).health(50.0))
        .build();
    let target = ids[1];

    engine.tick();

    assert_agent_alive!(engine, target);
    let defender = engine.colony(ColonyId(1)).expect("colony 1");
    let damage = engine.config().army.damage;
    let agent = defender.agent(target).expect("target alive");
    assert!((agent.health - (50.0 - damage)).abs() < 1e-9);
    assert!(defender.field.sample(Channel::Danger, agent.position) > 0.0);
}

#[test]
fn test_army_closes_distance_to_enemy() {
    let (mut engine, ids) = EngineBuilder::new()
        .with_agent(AgentBuilder::army(0).at(100.0, 150.0).speed(2.0))
        .with_agent(AgentBuilder::worker(1).at(140.0, 150.0).speed(0.0))
        .build();
    let army = ids[0];

    engine.tick();

    let colony = engine.colony(ColonyId(0)).expect("colony 0");
    let agent = colony.agent(army).expect("army alive");
    assert_eq!(agent.state, AgentState::Fight);
    assert!(agent.position.x > 100.0);
}

#[test]
fn test_same_colony_is_never_attacked() {
    let (mut engine, ids) = EngineBuilder::new()
        .with_agent(AgentBuilder::army(0).at(150.0, 150.0).speed(0.0))
        .with_agent(AgentBuilder::worker(0).at(151.0, 150.0).speed(0.0).health(1.0))
        .build();

    engine.run(5);

    assert_agent_alive!(engine, ids[1]);
    let colony = engine.colony(ColonyId(0)).expect("colony 0");
    assert_eq!(colony.agent(ids[0]).expect("army").state, AgentState::Patrol);
}

#[test]
fn test_grid_and_exhaustive_index_agree() {
    let build = |kind: EnemyIndexKind| {
        let mut builder = EngineBuilder::new()
            .with_seed(23)
            .with_config(|c| c.world.enemy_index = kind);
        for i in 0..6 {
            let offset = f64::from(i) * 6.0;
            builder = builder
                .with_agent(AgentBuilder::army(0).at(130.0 + offset, 140.0))
                .with_agent(AgentBuilder::army(1).at(140.0 + offset, 160.0))
                .with_agent(AgentBuilder::worker(1).at(150.0, 130.0 + offset));
        }
        builder.build().0
    };
    let mut grid = build(EnemyIndexKind::Grid);
    let mut scan = build(EnemyIndexKind::Exhaustive);

    for _ in 0..200 {
        grid.tick();
        scan.tick();
    }

    let a: Vec<_> = grid.agents().map(|a| (a.id, a.position, a.health)).collect();
    let b: Vec<_> = scan.agents().map(|a| (a.id, a.position, a.health)).collect();
    assert_eq!(a, b);
}
