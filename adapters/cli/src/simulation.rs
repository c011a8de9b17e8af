//! Drives the tank, the active fill policy and the presentation loop.
//!
//! One driver exists per deployment: the tick clock for the flood policy, or
//! the scripted fill presses for the manual policy. Every frame converts its
//! [`FrameInput`] into commands, applies them, pumps the policy until its
//! command batch drains, then presents a fresh scene.

use std::thread;

use anyhow::Result;
use tank_sim_core::{Command, Event, FillPolicy, FlowState, TankSnapshot};
use tank_sim_rendering::{FrameInput, RenderingBackend, Scene};
use tank_sim_system_manual_fill::{Config as ManualConfig, ManualFill};
use tank_sim_system_timed_fill::{Config as TimedConfig, TimedFill};
use tank_sim_world::{self as world, query, World};

use crate::clock::TickClock;
use crate::settings::{PolicyKind, Settings};

/// Upper bound on simulation frames when the caller does not provide one.
pub(crate) const DEFAULT_MAX_FRAMES: u32 = 10_000;

/// Result of a completed simulation run.
#[derive(Clone, Debug)]
pub(crate) struct Outcome {
    /// Number of frames the loop executed.
    pub(crate) frames: u32,
    /// Tank state at the end of the run.
    pub(crate) final_snapshot: TankSnapshot,
}

/// Runs the configured simulation to completion against the backend.
pub(crate) fn run(
    settings: &Settings,
    backend: &mut dyn RenderingBackend,
    max_frames: u32,
    realtime: bool,
) -> Result<Outcome> {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureTank {
            size: settings.grid_size,
            warning_threshold: settings.warning_threshold,
            time_budget: settings.time_budget,
        },
        &mut events,
    );

    let mut policy: Box<dyn FillPolicy> = match settings.policy {
        PolicyKind::Flood => Box::new(TimedFill::new(TimedConfig::new(settings.fill_interval))),
        PolicyKind::Manual => Box::new(ManualFill::new(ManualConfig::new(
            settings.increment,
            settings.max_fills,
        ))),
    };

    let mut clock = TickClock::new(settings.fill_interval);
    let mut frames = 0u32;

    while frames < max_frames {
        let input = scripted_input(settings.policy, frames, settings.max_fills);
        let mut batch = Vec::new();
        gather_input_commands(&world, &input, &mut clock, &mut batch);

        if settings.policy == PolicyKind::Flood {
            if let Some(dt) = clock.tick() {
                batch.push(Command::Tick { dt });
            }
        }

        if batch.is_empty() {
            break;
        }

        frames = frames.saturating_add(1);

        events.clear();
        for command in batch {
            world::apply(&mut world, command, &mut events);
        }
        announce(&events);

        pump_policy(&mut world, policy.as_mut(), &mut events);

        let snapshot = query::tank_snapshot(&world);
        backend.present(&Scene::from_snapshot(&snapshot))?;

        if snapshot.phase.is_terminal() {
            clock.stop();
            break;
        }

        if realtime && clock.is_running() {
            thread::sleep(settings.fill_interval);
        }
    }

    clock.stop();

    Ok(Outcome {
        frames,
        final_snapshot: query::tank_snapshot(&world),
    })
}

/// Derives the frame's input from the deployment script.
///
/// The flood deployment presses start on its first frame and then lets the
/// clock run; the manual deployment presses the fill button once per frame
/// until the action budget is spent.
fn scripted_input(policy: PolicyKind, frame: u32, max_fills: u32) -> FrameInput {
    match policy {
        PolicyKind::Flood => FrameInput {
            toggle_flow: frame == 0,
            ..FrameInput::default()
        },
        PolicyKind::Manual => FrameInput {
            fill: frame < max_fills,
            ..FrameInput::default()
        },
    }
}

fn gather_input_commands(
    world: &World,
    input: &FrameInput,
    clock: &mut TickClock,
    out: &mut Vec<Command>,
) {
    if input.toggle_flow {
        let flow = match query::flow_state(world) {
            FlowState::Paused => FlowState::Running,
            FlowState::Running => FlowState::Paused,
        };
        out.push(Command::SetFlow { flow });

        // The clock's lifetime shadows the flow: it only runs while water runs.
        if flow == FlowState::Running {
            clock.start();
        } else {
            clock.stop();
        }
    }

    if input.fill {
        out.push(Command::RequestFill);
    }

    if input.reset {
        out.push(Command::Reset);
    }
}

fn pump_policy(world: &mut World, policy: &mut dyn FillPolicy, events: &mut Vec<Event>) {
    loop {
        let snapshot = query::tank_snapshot(world);
        let mut commands = Vec::new();
        policy.handle(events, &snapshot, &mut commands);

        if commands.is_empty() {
            break;
        }

        events.clear();
        for command in commands {
            let mut generated = Vec::new();
            world::apply(world, command, &mut generated);
            announce(&generated);
            events.extend(generated);
        }
    }
}

fn announce(events: &[Event]) {
    for line in notifications(events) {
        println!("{line}");
    }
}

/// Formats the toast-style notifications carried by the event batch.
pub(crate) fn notifications(events: &[Event]) -> Vec<String> {
    let mut lines = Vec::new();
    for event in events {
        match event {
            Event::WarningRaised { filled, capacity } => {
                let remaining = if *capacity == 0 {
                    0.0
                } else {
                    (*capacity - *filled) as f32 * 100.0 / *capacity as f32
                };
                lines.push(format!(
                    "Tank almost full! {remaining:.1}% capacity remaining"
                ));
            }
            Event::TankFilled => lines.push("Tank is full. Please drain the tank.".to_owned()),
            Event::FillRejected { .. } => {
                lines.push("Fill ignored: the tank is full.".to_owned());
            }
            _ => {}
        }
    }
    lines
}
