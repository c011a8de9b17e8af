#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tank fill engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative tank, and pure fill policies. Adapters submit [`Command`]
//! values describing desired mutations, the tank executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for policies
//! to react to deterministically. Policies consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Tank Simulator. Watch the tank fill using flood fill.";

/// Commands that express all permissible tank mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the tank from scratch using the provided parameters.
    ConfigureTank {
        /// Edge length of the square cell grid.
        size: GridSize,
        /// Fill level at which the warning is raised.
        warning_threshold: WarningThreshold,
        /// Optional cap on total simulated fill time before the tank is
        /// declared full.
        time_budget: Option<Duration>,
    },
    /// Requests that the water flow switch to the provided state.
    SetFlow {
        /// Flow state the tank should adopt.
        flow: FlowState,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests one user-triggered fill step.
    RequestFill,
    /// Requests a flood fill of the empty region reachable from the cell.
    FloodFrom {
        /// Cell the flood traversal starts from.
        cell: CellCoord,
    },
    /// Requests that cells be filled in scan order until the tank holds the
    /// target count.
    FillToTarget {
        /// Total number of filled cells the tank should reach.
        target: u32,
    },
    /// Drains the tank back to its empty state.
    Reset,
}

/// Events broadcast by the tank after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the water flow switched state.
    FlowChanged {
        /// Flow state that became active.
        flow: FlowState,
    },
    /// Forwards an accepted user fill request to the active fill policy.
    FillRequested,
    /// Reports the new water level after an accepted fill operation.
    WaterLevelChanged {
        /// Number of cells filled after the operation completed.
        filled: u32,
    },
    /// Announces, once per lifecycle, that the warning threshold was crossed.
    WarningRaised {
        /// Number of cells filled at the moment of crossing.
        filled: u32,
        /// Total number of cells in the tank.
        capacity: u32,
    },
    /// Announces that the fill state machine entered a new phase.
    PhaseChanged {
        /// Phase that became active after processing commands.
        phase: FillPhase,
    },
    /// Announces that the tank reached its terminal full state.
    TankFilled,
    /// Reports that a fill request was refused.
    FillRejected {
        /// Specific reason the request was refused.
        reason: FillRejection,
    },
    /// Confirms that the tank was drained back to its empty state.
    TankReset,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Edge length of the square tank grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridSize(u32);

impl GridSize {
    /// Creates a new grid size wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying edge length.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of cells contained in the square grid.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.0.saturating_mul(self.0)
    }

    /// Row index of the bottom row, if the grid has any rows.
    #[must_use]
    pub const fn bottom_row(&self) -> Option<u32> {
        match self.0 {
            0 => None,
            edge => Some(edge - 1),
        }
    }
}

/// Fill level, expressed as a whole percentage, at which the warning fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WarningThreshold(u8);

impl WarningThreshold {
    /// Creates a new threshold, clamping values above 100 percent.
    #[must_use]
    pub const fn from_percent(percent: u8) -> Self {
        if percent > 100 {
            Self(100)
        } else {
            Self(percent)
        }
    }

    /// Threshold expressed as a whole percentage in the range 0..=100.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.0
    }

    /// Reports whether the provided fill level reaches the threshold.
    ///
    /// The comparison is exact integer arithmetic so the crossing happens on
    /// the first cell that satisfies it, never a cell early or late.
    #[must_use]
    pub fn reached_by(&self, filled: u32, capacity: u32) -> bool {
        if capacity == 0 {
            return false;
        }
        u64::from(filled) * 100 >= u64::from(capacity) * u64::from(self.0)
    }
}

/// Phases of the tank fill state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillPhase {
    /// No cell holds water.
    Empty,
    /// Water is present but below the warning threshold.
    Filling,
    /// The warning threshold has been crossed.
    Warning,
    /// The tank accepts no further water until it is drained.
    Full,
}

impl FillPhase {
    /// Reports whether the phase terminates the fill lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Describes whether water is currently flowing into the tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    /// The clock drives fill steps.
    Running,
    /// The clock is held; no simulated time passes.
    Paused,
}

/// Reasons a fill request may be refused by the tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillRejection {
    /// The tank is full; it must be drained before it accepts water again.
    TankFull,
}

/// Immutable snapshot of the complete tank state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TankSnapshot {
    /// Edge length of the square cell grid.
    pub size: GridSize,
    /// Dense row-major cell states; `true` marks a filled cell.
    pub cells: Vec<bool>,
    /// Number of filled cells.
    pub filled: u32,
    /// Current phase of the fill state machine.
    pub phase: FillPhase,
    /// Current flow state.
    pub flow: FlowState,
    /// Indicates whether the warning threshold was crossed this lifecycle.
    pub warning_crossed: bool,
    /// Simulated time accumulated since the last reset.
    pub elapsed: Duration,
    /// Configured cap on simulated fill time, if any.
    pub time_budget: Option<Duration>,
}

impl TankSnapshot {
    /// Total number of cells in the tank.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.size.cell_count()
    }

    /// Fill level expressed as a percentage in the range 0.0..=100.0.
    #[must_use]
    pub fn fill_percentage(&self) -> f32 {
        let capacity = self.capacity();
        if capacity == 0 {
            return 0.0;
        }
        self.filled as f32 * 100.0 / capacity as f32
    }

    /// Simulated time left before the budget elapses, if a budget is set.
    #[must_use]
    pub fn remaining_time(&self) -> Option<Duration> {
        self.time_budget
            .map(|budget| budget.saturating_sub(self.elapsed))
    }

    /// Borrowed view of the cell grid.
    #[must_use]
    pub fn grid(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size)
    }
}

/// Read-only view into the dense cell grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [bool],
    size: GridSize,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided cell slice.
    #[must_use]
    pub const fn new(cells: &'a [bool], size: GridSize) -> Self {
        Self { cells, size }
    }

    /// Edge length of the viewed grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Reports whether the cell holds water.
    ///
    /// Out-of-bounds coordinates read as filled so callers never treat them
    /// as fillable.
    #[must_use]
    pub fn is_filled(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(true, |index| self.cells.get(index).copied().unwrap_or(true))
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        self.cells.iter().copied()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let edge = self.size.get();
        if cell.column() < edge && cell.row() < edge {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(edge).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Strategy deciding which cells become filled per tick or user action.
///
/// Policies are pure deciders: they never mutate the grid themselves, they
/// observe broadcast events plus an immutable snapshot and answer with
/// commands for the tank to execute. Exactly one policy drives a deployment.
pub trait FillPolicy {
    /// Consumes events and the current snapshot to emit fill commands.
    fn handle(&mut self, events: &[Event], tank: &TankSnapshot, out: &mut Vec<Command>);
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, FillPhase, FillRejection, GridSize, GridView, TankSnapshot, WarningThreshold,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(3, 17));
    }

    #[test]
    fn grid_size_round_trips_through_bincode() {
        assert_round_trip(&GridSize::new(20));
    }

    #[test]
    fn warning_threshold_round_trips_through_bincode() {
        assert_round_trip(&WarningThreshold::from_percent(80));
    }

    #[test]
    fn fill_phase_round_trips_through_bincode() {
        assert_round_trip(&FillPhase::Warning);
    }

    #[test]
    fn fill_rejection_round_trips_through_bincode() {
        assert_round_trip(&FillRejection::TankFull);
    }

    #[test]
    fn threshold_clamps_excess_percentages() {
        assert_eq!(WarningThreshold::from_percent(150).percent(), 100);
        assert_eq!(WarningThreshold::from_percent(80).percent(), 80);
    }

    #[test]
    fn threshold_crossing_is_exact_on_a_ten_by_ten_grid() {
        let threshold = WarningThreshold::from_percent(80);
        assert!(!threshold.reached_by(79, 100));
        assert!(threshold.reached_by(80, 100));
        assert!(threshold.reached_by(81, 100));
    }

    #[test]
    fn threshold_never_fires_on_an_empty_grid() {
        let threshold = WarningThreshold::from_percent(0);
        assert!(!threshold.reached_by(0, 0));
    }

    #[test]
    fn grid_size_exposes_bottom_row() {
        assert_eq!(GridSize::new(20).bottom_row(), Some(19));
        assert_eq!(GridSize::new(0).bottom_row(), None);
    }

    #[test]
    fn grid_view_reads_out_of_bounds_as_filled() {
        let cells = vec![false; 4];
        let view = GridView::new(&cells, GridSize::new(2));
        assert!(!view.is_filled(CellCoord::new(1, 1)));
        assert!(view.is_filled(CellCoord::new(2, 0)));
        assert!(view.is_filled(CellCoord::new(0, 2)));
    }

    #[test]
    fn snapshot_reports_percentage_and_remaining_time() {
        let snapshot = TankSnapshot {
            size: GridSize::new(10),
            cells: vec![false; 100],
            filled: 25,
            phase: FillPhase::Filling,
            flow: super::FlowState::Running,
            warning_crossed: false,
            elapsed: Duration::from_secs(3),
            time_budget: Some(Duration::from_secs(10)),
        };

        assert!((snapshot.fill_percentage() - 25.0).abs() < f32::EPSILON);
        assert_eq!(snapshot.remaining_time(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn terminal_phase_is_full_only() {
        assert!(FillPhase::Full.is_terminal());
        assert!(!FillPhase::Warning.is_terminal());
        assert!(!FillPhase::Filling.is_terminal());
        assert!(!FillPhase::Empty.is_terminal());
    }
}
