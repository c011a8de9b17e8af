#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tank state management for the tank fill simulator.
//!
//! All mutation flows through [`apply`]; adapters and policies observe the
//! tank exclusively through the [`query`] module and broadcast events. Each
//! accepted fill operation completes atomically before any observer sees the
//! result.

mod flood;

use std::time::Duration;

use tank_sim_core::{
    Command, Event, FillPhase, FillRejection, FlowState, GridSize, WarningThreshold,
    WELCOME_BANNER,
};

const DEFAULT_GRID_SIZE: GridSize = GridSize::new(20);
const DEFAULT_WARNING_THRESHOLD: WarningThreshold = WarningThreshold::from_percent(80);

/// Represents the authoritative tank state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    size: GridSize,
    cells: Vec<bool>,
    filled: u32,
    phase: FillPhase,
    flow: FlowState,
    warning_threshold: WarningThreshold,
    warning_crossed: bool,
    elapsed: Duration,
    time_budget: Option<Duration>,
}

impl World {
    /// Creates a new tank ready for simulation with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_configuration(DEFAULT_GRID_SIZE, DEFAULT_WARNING_THRESHOLD, None)
    }

    fn with_configuration(
        size: GridSize,
        warning_threshold: WarningThreshold,
        time_budget: Option<Duration>,
    ) -> Self {
        let capacity = usize::try_from(size.cell_count()).unwrap_or(0);
        Self {
            banner: WELCOME_BANNER,
            size,
            cells: vec![false; capacity],
            filled: 0,
            phase: FillPhase::Empty,
            flow: FlowState::Paused,
            warning_threshold,
            warning_crossed: false,
            elapsed: Duration::ZERO,
            time_budget,
        }
    }

    fn drain(&mut self) {
        self.cells.fill(false);
        self.filled = 0;
        self.phase = FillPhase::Empty;
        self.flow = FlowState::Paused;
        self.warning_crossed = false;
        self.elapsed = Duration::ZERO;
    }

    fn fill_to_target(&mut self, target: u32) -> u32 {
        let edge = self.size.get();
        if edge == 0 {
            return 0;
        }

        let target = target.min(self.size.cell_count());
        let width = usize::try_from(edge).unwrap_or(0);
        let mut marked = 0u32;

        // Fixed scan order: bottom row first, then upward, left to right.
        'rows: for row in (0..edge).rev() {
            for column in 0..edge {
                if self.filled >= target {
                    break 'rows;
                }

                let index = usize::try_from(row).unwrap_or(0) * width + column as usize;
                if let Some(cell) = self.cells.get_mut(index) {
                    if !*cell {
                        *cell = true;
                        self.filled = self.filled.saturating_add(1);
                        marked = marked.saturating_add(1);
                    }
                }
            }
        }

        marked
    }

    /// Publishes the new level and walks the state machine after a fill.
    ///
    /// A single operation may cross the warning threshold and reach capacity
    /// at once; the warning is announced before the terminal phase change,
    /// and only the final phase produces a `PhaseChanged` event.
    fn note_level_change(&mut self, out_events: &mut Vec<Event>) {
        out_events.push(Event::WaterLevelChanged {
            filled: self.filled,
        });

        let capacity = self.size.cell_count();
        if !self.warning_crossed && self.warning_threshold.reached_by(self.filled, capacity) {
            self.warning_crossed = true;
            out_events.push(Event::WarningRaised {
                filled: self.filled,
                capacity,
            });
        }

        let next_phase = if capacity > 0 && self.filled >= capacity {
            FillPhase::Full
        } else if self.warning_crossed {
            FillPhase::Warning
        } else if self.filled > 0 {
            FillPhase::Filling
        } else {
            FillPhase::Empty
        };

        if next_phase != self.phase {
            self.phase = next_phase;
            out_events.push(Event::PhaseChanged { phase: next_phase });
            if next_phase == FillPhase::Full {
                out_events.push(Event::TankFilled);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the tank, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTank {
            size,
            warning_threshold,
            time_budget,
        } => {
            *world = World::with_configuration(size, warning_threshold, time_budget);
            out_events.push(Event::TankReset);
        }
        Command::SetFlow { flow } => {
            if world.flow != flow {
                world.flow = flow;
                out_events.push(Event::FlowChanged { flow });
            }
        }
        Command::Tick { dt } => {
            if world.flow != FlowState::Running || world.phase.is_terminal() {
                return;
            }

            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            if let Some(budget) = world.time_budget {
                if world.elapsed >= budget {
                    world.phase = FillPhase::Full;
                    out_events.push(Event::PhaseChanged {
                        phase: FillPhase::Full,
                    });
                    out_events.push(Event::TankFilled);
                }
            }
        }
        Command::RequestFill => {
            if world.phase.is_terminal() {
                out_events.push(Event::FillRejected {
                    reason: FillRejection::TankFull,
                });
                return;
            }

            out_events.push(Event::FillRequested);
        }
        Command::FloodFrom { cell } => {
            if world.phase.is_terminal() {
                out_events.push(Event::FillRejected {
                    reason: FillRejection::TankFull,
                });
                return;
            }

            let marked = flood::flood_fill(&mut world.cells, world.size, cell);
            if marked > 0 {
                world.filled = world.filled.saturating_add(marked);
                world.note_level_change(out_events);
            }
        }
        Command::FillToTarget { target } => {
            if world.phase.is_terminal() {
                out_events.push(Event::FillRejected {
                    reason: FillRejection::TankFull,
                });
                return;
            }

            if world.fill_to_target(target) > 0 {
                world.note_level_change(out_events);
            }
        }
        Command::Reset => {
            world.drain();
            out_events.push(Event::TankReset);
        }
    }
}

/// Query functions that provide read-only access to the tank state.
pub mod query {
    use super::World;
    use tank_sim_core::{FillPhase, FlowState, GridView, TankSnapshot};

    /// Retrieves the welcome banner that adapters may display.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures an immutable snapshot of the complete tank state.
    #[must_use]
    pub fn tank_snapshot(world: &World) -> TankSnapshot {
        TankSnapshot {
            size: world.size,
            cells: world.cells.clone(),
            filled: world.filled,
            phase: world.phase,
            flow: world.flow,
            warning_crossed: world.warning_crossed,
            elapsed: world.elapsed,
            time_budget: world.time_budget,
        }
    }

    /// Exposes a borrowed view of the cell grid for rendering.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        GridView::new(&world.cells, world.size)
    }

    /// Current phase of the fill state machine.
    #[must_use]
    pub fn fill_phase(world: &World) -> FillPhase {
        world.phase
    }

    /// Current flow state.
    #[must_use]
    pub fn flow_state(world: &World) -> FlowState {
        world.flow
    }
}
