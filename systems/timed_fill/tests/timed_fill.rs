use std::time::Duration;

use tank_sim_core::{Command, Event, FillPhase, FillPolicy, FlowState, GridSize, WarningThreshold};
use tank_sim_system_timed_fill::{Config, TimedFill};
use tank_sim_world::{self as world, query, World};

fn configure(world: &mut World, edge: u32, budget: Option<Duration>) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::ConfigureTank {
            size: GridSize::new(edge),
            warning_threshold: WarningThreshold::from_percent(80),
            time_budget: budget,
        },
        &mut events,
    );
    world::apply(
        world,
        Command::SetFlow {
            flow: FlowState::Running,
        },
        &mut events,
    );
}

/// Advances the clock once and pumps policy commands until the batch drains.
fn drive(world: &mut World, policy: &mut TimedFill, dt: Duration, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
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
fn one_interval_floods_the_open_tank() {
    let mut world = World::new();
    configure(&mut world, 4, None);

    let mut policy = TimedFill::new(Config::new(Duration::from_millis(100)));
    let mut log = Vec::new();
    drive(&mut world, &mut policy, Duration::from_millis(100), &mut log);

    let snapshot = query::tank_snapshot(&world);
    assert_eq!(snapshot.filled, 16);
    assert_eq!(snapshot.phase, FillPhase::Full);
    assert!(log.contains(&Event::WaterLevelChanged { filled: 16 }));
    assert!(log.contains(&Event::TankFilled));
}

#[test]
fn short_ticks_accumulate_before_filling() {
    let mut world = World::new();
    configure(&mut world, 4, None);

    let mut policy = TimedFill::new(Config::new(Duration::from_millis(100)));
    let mut log = Vec::new();

    drive(&mut world, &mut policy, Duration::from_millis(60), &mut log);
    assert_eq!(query::tank_snapshot(&world).filled, 0, "interval not yet due");

    drive(&mut world, &mut policy, Duration::from_millis(60), &mut log);
    assert_eq!(query::tank_snapshot(&world).filled, 16);
}

#[test]
fn terminal_tank_keeps_the_policy_quiet() {
    let mut world = World::new();
    configure(&mut world, 4, None);

    let mut policy = TimedFill::new(Config::new(Duration::from_millis(100)));
    let mut log = Vec::new();
    drive(&mut world, &mut policy, Duration::from_millis(100), &mut log);
    assert_eq!(query::fill_phase(&world), FillPhase::Full);

    let before = log.len();
    drive(&mut world, &mut policy, Duration::from_millis(100), &mut log);
    assert_eq!(log.len(), before, "full tank produces no further events");
}

#[test]
fn budget_exhaustion_stops_the_run_before_any_fill() {
    let mut world = World::new();
    configure(&mut world, 10, Some(Duration::from_millis(500)));

    // Interval far beyond the budget so the clock runs dry first.
    let mut policy = TimedFill::new(Config::new(Duration::from_secs(10)));
    let mut log = Vec::new();
    for _ in 0..5 {
        drive(&mut world, &mut policy, Duration::from_millis(100), &mut log);
    }

    let snapshot = query::tank_snapshot(&world);
    assert_eq!(snapshot.filled, 0);
    assert_eq!(snapshot.phase, FillPhase::Full);
    assert_eq!(snapshot.remaining_time(), Some(Duration::ZERO));
    assert!(log.contains(&Event::TankFilled));
}

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay();
    let second = replay();

    assert_eq!(first.0, second.0, "event logs diverged between runs");
    assert_eq!(first.1, second.1, "final snapshots diverged between runs");
}

fn replay() -> (Vec<Event>, tank_sim_core::TankSnapshot) {
    let mut world = World::new();
    configure(&mut world, 6, Some(Duration::from_secs(2)));

    let mut policy = TimedFill::new(Config::new(Duration::from_millis(150)));
    let mut log = Vec::new();
    for _ in 0..8 {
        drive(&mut world, &mut policy, Duration::from_millis(100), &mut log);
    }

    (log, query::tank_snapshot(&world))
}
