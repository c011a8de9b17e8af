//! Effective simulation settings resolved from flags, scenario and file.
//!
//! Precedence, highest first: command-line flags, a `--scenario` string, a
//! `--config` TOML file, then the per-policy defaults recovered from the
//! original experience.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tank_sim_core::{GridSize, WarningThreshold};

use crate::scenario::ScenarioSnapshot;
use crate::Args;

const DEFAULT_FLOOD_GRID: u32 = 20;
const DEFAULT_MANUAL_GRID: u32 = 10;
const DEFAULT_WARNING_PERCENT: u8 = 80;
const DEFAULT_FILL_INTERVAL_MS: u64 = 100;
const DEFAULT_INCREMENT: u32 = 5;
const DEFAULT_MAX_FILLS: u32 = 20;

/// Fill strategies selectable per deployment.
///
/// The two strategies are mutually exclusive; a deployment picks exactly one
/// at startup and never composes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PolicyKind {
    /// Clock-driven flood fill from the bottom row.
    Flood,
    /// User-triggered count-based filling.
    Manual,
}

/// Validation failures for resolved settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SettingsError {
    /// The grid must contain at least one cell.
    #[error("grid size must be at least 1")]
    GridTooSmall,
    /// The flood policy needs a non-zero cadence to make progress.
    #[error("fill interval must be non-zero for the flood policy")]
    ZeroFillInterval,
    /// The manual policy needs a non-zero increment to make progress.
    #[error("increment must be at least 1 for the manual policy")]
    ZeroIncrement,
    /// The manual policy needs at least one permitted fill action.
    #[error("max fills must be at least 1 for the manual policy")]
    ZeroMaxFills,
}

/// Effective parameters the simulation runs with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    /// Fill policy driving the deployment.
    pub(crate) policy: PolicyKind,
    /// Edge length of the square tank grid.
    pub(crate) grid_size: GridSize,
    /// Fill level at which the warning is raised.
    pub(crate) warning_threshold: WarningThreshold,
    /// Simulated time between flood fill steps.
    pub(crate) fill_interval: Duration,
    /// Optional cap on total simulated fill time.
    pub(crate) time_budget: Option<Duration>,
    /// Cells added per fill action under the manual policy.
    pub(crate) increment: u32,
    /// Maximum number of fill actions per lifecycle under the manual policy.
    pub(crate) max_fills: u32,
}

impl Settings {
    /// Resolves the effective settings for the provided arguments.
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };

        let scenario = args
            .scenario
            .as_deref()
            .map(ScenarioSnapshot::decode)
            .transpose()
            .context("could not decode the provided scenario string")?;

        let policy = args
            .policy
            .or_else(|| scenario.as_ref().map(|scenario| scenario.policy))
            .or(file.policy)
            .unwrap_or(PolicyKind::Flood);

        let default_grid = match policy {
            PolicyKind::Flood => DEFAULT_FLOOD_GRID,
            PolicyKind::Manual => DEFAULT_MANUAL_GRID,
        };

        let grid_size = args
            .grid_size
            .or_else(|| scenario.as_ref().map(|scenario| scenario.size))
            .or(file.grid_size)
            .unwrap_or(default_grid);

        let warning_percent = args
            .warning_threshold
            .or_else(|| {
                scenario
                    .as_ref()
                    .map(|scenario| scenario.warning_threshold_percent)
            })
            .or(file.warning_threshold)
            .unwrap_or(DEFAULT_WARNING_PERCENT);

        let fill_interval_ms = args
            .fill_interval_ms
            .or_else(|| scenario.as_ref().map(|scenario| scenario.fill_interval_ms))
            .or(file.fill_interval_ms)
            .unwrap_or(DEFAULT_FILL_INTERVAL_MS);

        let time_budget_ms = args
            .time_budget_ms
            .or_else(|| {
                scenario
                    .as_ref()
                    .and_then(|scenario| scenario.time_budget_ms)
            })
            .or(file.time_budget_ms);

        let increment = args
            .increment
            .or_else(|| scenario.as_ref().map(|scenario| scenario.increment))
            .or(file.increment)
            .unwrap_or(DEFAULT_INCREMENT);

        let max_fills = args
            .max_fills
            .or_else(|| scenario.as_ref().map(|scenario| scenario.max_fills))
            .or(file.max_fills)
            .unwrap_or(DEFAULT_MAX_FILLS);

        let settings = Self {
            policy,
            grid_size: GridSize::new(grid_size),
            warning_threshold: WarningThreshold::from_percent(warning_percent),
            fill_interval: Duration::from_millis(fill_interval_ms),
            time_budget: time_budget_ms.map(Duration::from_millis),
            increment,
            max_fills,
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.grid_size.get() == 0 {
            return Err(SettingsError::GridTooSmall);
        }

        match self.policy {
            PolicyKind::Flood => {
                if self.fill_interval.is_zero() {
                    return Err(SettingsError::ZeroFillInterval);
                }
            }
            PolicyKind::Manual => {
                if self.increment == 0 {
                    return Err(SettingsError::ZeroIncrement);
                }
                if self.max_fills == 0 {
                    return Err(SettingsError::ZeroMaxFills);
                }
            }
        }

        Ok(())
    }

    /// Captures the effective settings as a shareable scenario.
    #[must_use]
    pub(crate) fn to_scenario(&self) -> ScenarioSnapshot {
        ScenarioSnapshot {
            size: self.grid_size.get(),
            warning_threshold_percent: self.warning_threshold.percent(),
            policy: self.policy,
            fill_interval_ms: u64::try_from(self.fill_interval.as_millis()).unwrap_or(u64::MAX),
            time_budget_ms: self
                .time_budget
                .map(|budget| u64::try_from(budget.as_millis()).unwrap_or(u64::MAX)),
            increment: self.increment,
            max_fills: self.max_fills,
        }
    }
}

/// Optional settings loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    policy: Option<PolicyKind>,
    grid_size: Option<u32>,
    warning_threshold: Option<u8>,
    fill_interval_ms: Option<u64>,
    time_budget_ms: Option<u64>,
    increment: Option<u32>,
    max_fills: Option<u32>,
}

impl FileSettings {
    fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read settings file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("could not parse settings file {}", path.display()))
    }
}
