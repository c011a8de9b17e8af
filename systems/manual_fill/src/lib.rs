#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Discrete fill policy driven by user-triggered fill actions.

use tank_sim_core::{Command, Event, FillPolicy, TankSnapshot};

/// Configuration parameters required to construct the manual fill policy.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    increment: u32,
    max_fills: u32,
}

impl Config {
    /// Creates a new configuration from the per-action cell increment and the
    /// maximum number of fill actions per lifecycle.
    #[must_use]
    pub const fn new(increment: u32, max_fills: u32) -> Self {
        Self {
            increment,
            max_fills,
        }
    }
}

/// Pure policy that turns each accepted fill request into a target level.
///
/// The n-th accepted action (1-based) asks the tank to hold `n * increment`
/// filled cells; the tank satisfies the target in its fixed scan order. Once
/// `max_fills` actions have been accepted the policy ignores further requests
/// until the tank is drained.
#[derive(Debug)]
pub struct ManualFill {
    increment: u32,
    max_fills: u32,
    accepted: u32,
}

impl ManualFill {
    /// Creates a new manual fill policy using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            increment: config.increment,
            max_fills: config.max_fills,
            accepted: 0,
        }
    }

    /// Number of fill actions accepted since the last reset.
    #[must_use]
    pub const fn fills_performed(&self) -> u32 {
        self.accepted
    }

    /// Reports whether the policy stopped accepting fill actions.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.accepted >= self.max_fills
    }
}

impl FillPolicy for ManualFill {
    fn handle(&mut self, events: &[Event], tank: &TankSnapshot, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TankReset => self.accepted = 0,
                Event::FillRequested => {
                    if tank.phase.is_terminal() || self.is_exhausted() {
                        continue;
                    }

                    self.accepted = self.accepted.saturating_add(1);
                    let target = self.accepted.saturating_mul(self.increment);
                    out.push(Command::FillToTarget { target });
                }
                _ => {}
            }
        }
    }
}
