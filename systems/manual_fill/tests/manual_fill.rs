use std::time::Duration;

use tank_sim_core::{
    Command, Event, FillPhase, FillPolicy, FillRejection, GridSize, WarningThreshold,
};
use tank_sim_system_manual_fill::{Config, ManualFill};
use tank_sim_world::{self as world, query, World};

fn configure(world: &mut World, edge: u32) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::ConfigureTank {
            size: GridSize::new(edge),
            warning_threshold: WarningThreshold::from_percent(80),
            time_budget: None,
        },
        &mut events,
    );
}

/// Submits one user fill action and pumps policy commands until they drain.
fn press_fill(world: &mut World, policy: &mut ManualFill, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    world::apply(world, Command::RequestFill, &mut events);
    log.extend(events.iter().copied());

    loop {
        let snapshot = query::tank_snapshot(world);
        let mut commands = Vec::new();
        policy.handle(&events, &snapshot, &mut commands);

        if commands.is_empty() {
            break;
        }

        events.clear();
        for command in commands {
            let mut generated = Vec::new();
            world::apply(world, command, &mut generated);
            log.extend(generated.iter().copied());
            events.extend(generated);
        }
    }
}

#[test]
fn twenty_fill_actions_fill_a_ten_by_ten_tank() {
    let mut world = World::new();
    configure(&mut world, 10);

    let mut policy = ManualFill::new(Config::new(5, 20));
    let mut log = Vec::new();

    for action in 1..=20u32 {
        press_fill(&mut world, &mut policy, &mut log);
        assert_eq!(query::tank_snapshot(&world).filled, action * 5);
    }

    let snapshot = query::tank_snapshot(&world);
    assert_eq!(snapshot.filled, 100);
    assert_eq!(snapshot.phase, FillPhase::Full);
    assert!(policy.is_exhausted());

    // Further presses are rejected no-ops.
    let before = query::tank_snapshot(&world);
    press_fill(&mut world, &mut policy, &mut log);
    assert_eq!(query::tank_snapshot(&world), before);
    assert!(log.contains(&Event::FillRejected {
        reason: FillRejection::TankFull,
    }));
}

#[test]
fn warning_is_raised_exactly_once_at_eighty_cells() {
    let mut world = World::new();
    configure(&mut world, 10);

    let mut policy = ManualFill::new(Config::new(5, 20));
    let mut log = Vec::new();
    for _ in 0..20 {
        press_fill(&mut world, &mut policy, &mut log);
    }

    let warnings: Vec<&Event> = log
        .iter()
        .filter(|event| matches!(event, Event::WarningRaised { .. }))
        .collect();
    assert_eq!(
        warnings,
        vec![&Event::WarningRaised {
            filled: 80,
            capacity: 100,
        }]
    );
}

#[test]
fn reset_rearms_an_exhausted_policy() {
    let mut world = World::new();
    configure(&mut world, 10);

    let mut policy = ManualFill::new(Config::new(50, 2));
    let mut log = Vec::new();
    press_fill(&mut world, &mut policy, &mut log);
    press_fill(&mut world, &mut policy, &mut log);
    assert!(policy.is_exhausted());
    assert_eq!(query::fill_phase(&world), FillPhase::Full);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Reset, &mut events);
    let snapshot = query::tank_snapshot(&world);
    policy.handle(&events, &snapshot, &mut Vec::new());

    assert!(!policy.is_exhausted());
    assert_eq!(policy.fills_performed(), 0);
    assert_eq!(snapshot.filled, 0);
    assert_eq!(snapshot.elapsed, Duration::ZERO);

    log.clear();
    press_fill(&mut world, &mut policy, &mut log);
    assert_eq!(query::tank_snapshot(&world).filled, 50);
}
