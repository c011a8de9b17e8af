#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous fill policy that floods from the bottom row on a fixed cadence.

use std::time::Duration;

use tank_sim_core::{CellCoord, Command, Event, FillPolicy, FlowState, TankSnapshot};

/// Configuration parameters required to construct the timed fill policy.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    fill_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided fill cadence.
    #[must_use]
    pub const fn new(fill_interval: Duration) -> Self {
        Self { fill_interval }
    }
}

/// Pure policy that requests one flood fill per elapsed fill interval.
///
/// While the flow is running the policy accumulates simulated time from
/// `TimeAdvanced` events; each whole interval produces one flood-fill request
/// for the first empty cell found scanning the bottom row left to right. The
/// accumulator resets whenever the flow pauses.
#[derive(Debug)]
pub struct TimedFill {
    fill_interval: Duration,
    accumulator: Duration,
}

impl TimedFill {
    /// Creates a new timed fill policy using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            fill_interval: config.fill_interval,
            accumulator: Duration::ZERO,
        }
    }

    fn resolve_fill_attempts(&mut self) -> usize {
        if self.fill_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.fill_interval {
            self.accumulator -= self.fill_interval;
            attempts += 1;
        }
        attempts
    }
}

impl FillPolicy for TimedFill {
    fn handle(&mut self, events: &[Event], tank: &TankSnapshot, out: &mut Vec<Command>) {
        if tank.flow != FlowState::Running {
            self.accumulator = Duration::ZERO;
            return;
        }

        if tank.phase.is_terminal() || self.fill_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let attempts = self.resolve_fill_attempts();
        if attempts == 0 {
            return;
        }

        let Some(start) = first_empty_bottom_cell(tank) else {
            return;
        };

        // Later attempts in the same batch target the same cell; the tank
        // treats a flood from a filled cell as a no-op.
        for _ in 0..attempts {
            out.push(Command::FloodFrom { cell: start });
        }
    }
}

fn first_empty_bottom_cell(tank: &TankSnapshot) -> Option<CellCoord> {
    let row = tank.size.bottom_row()?;
    let grid = tank.grid();
    (0..tank.size.get())
        .map(|column| CellCoord::new(column, row))
        .find(|cell| !grid.is_filled(*cell))
}
