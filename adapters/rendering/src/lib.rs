#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for tank simulator adapters.
//!
//! The simulation produces declarative [`Scene`] values; backends decide how
//! to draw them. Backends stay read-only observers: every datum in a scene is
//! derived from a tank snapshot, never the other way around.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use tank_sim_core::{CellCoord, FillPhase, FlowState, GridSize, TankSnapshot};

/// Side length of a rendered cell expressed in world units.
pub const CELL_EDGE: f32 = 24.0;

/// Height of the fill meter bar expressed in world units.
const METER_HEIGHT: f32 = 10.0;

/// Vertical gap between the grid and the fill meter.
const METER_GAP: f32 = 12.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Water color applied to filled cells.
pub const WATER_COLOR: Color = Color::from_rgb_u8(0x7d, 0xd3, 0xfc);

/// Translucent glass color applied to empty cells.
pub const GLASS_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0x20 as f32 / 255.0);

/// Accent color applied to the warning indicator.
pub const WARNING_COLOR: Color = Color::from_rgb_u8(0xef, 0x44, 0x44);

/// Edge-triggered input gathered by adapters before updating the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a start/pause toggle on this frame.
    pub toggle_flow: bool,
    /// Whether the adapter detected a user fill action on this frame.
    pub fill: bool,
    /// Whether the adapter detected a reset request on this frame.
    pub reset: bool,
}

/// Declarative description of a single rendered frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Cell grid presentation, including per-cell fill flags.
    pub grid: GridPresentation,
    /// Horizontal meter summarising the fill level.
    pub meter: FillMeter,
    /// Warning indicator overlay, present while the warning latch is set.
    pub warning: Option<WarningIndicator>,
    /// Phase of the fill state machine at snapshot time.
    pub phase: FillPhase,
    /// Flow state at snapshot time.
    pub flow: FlowState,
    /// Simulated time left before the budget elapses, if a budget is set.
    pub remaining_time: Option<Duration>,
}

impl Scene {
    /// Derives the scene for the provided tank snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &TankSnapshot) -> Self {
        let grid = GridPresentation::from_snapshot(snapshot);
        let meter = FillMeter::below_grid(&grid, snapshot.fill_percentage());
        let warning = snapshot
            .warning_crossed
            .then(|| WarningIndicator::centered_on(&grid));

        Self {
            grid,
            meter,
            warning,
            phase: snapshot.phase,
            flow: snapshot.flow,
            remaining_time: snapshot.remaining_time(),
        }
    }
}

/// Grid portion of a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPresentation {
    /// Edge length of the grid in cells.
    pub size: GridSize,
    /// Upper-left corner of the grid in world units.
    pub origin: Vec2,
    /// Side length of a single square cell in world units.
    pub cell_edge: f32,
    /// Dense row-major fill flags copied from the snapshot.
    pub cells: Vec<bool>,
    /// Color applied to filled cells.
    pub water_color: Color,
    /// Color applied to empty cells.
    pub glass_color: Color,
}

impl GridPresentation {
    fn from_snapshot(snapshot: &TankSnapshot) -> Self {
        Self {
            size: snapshot.size,
            origin: Vec2::ZERO,
            cell_edge: CELL_EDGE,
            cells: snapshot.cells.clone(),
            water_color: WATER_COLOR,
            glass_color: GLASS_COLOR,
        }
    }

    /// Total width and height of the grid in world units.
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        let edge = self.size.get() as f32 * self.cell_edge;
        Vec2::new(edge, edge)
    }

    /// Center of the provided cell in world units.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.origin
            + Vec2::new(
                (cell.column() as f32 + 0.5) * self.cell_edge,
                (cell.row() as f32 + 0.5) * self.cell_edge,
            )
    }

    /// Reports whether the cell at the provided coordinate holds water.
    ///
    /// Out-of-bounds coordinates read as empty so backends can overscan.
    #[must_use]
    pub fn is_filled(&self, cell: CellCoord) -> bool {
        let edge = self.size.get();
        if cell.column() >= edge || cell.row() >= edge {
            return false;
        }

        let index = cell.row() as usize * edge as usize + cell.column() as usize;
        self.cells.get(index).copied().unwrap_or(false)
    }
}

/// Horizontal progress meter summarising the fill level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillMeter {
    /// Upper-left corner of the meter in world units.
    pub origin: Vec2,
    /// Meter dimensions in world units.
    pub size: Vec2,
    /// Fill level expressed as a percentage in the range 0.0..=100.0.
    pub percentage: f32,
}

impl FillMeter {
    fn below_grid(grid: &GridPresentation, percentage: f32) -> Self {
        let extent = grid.extent();
        Self {
            origin: grid.origin + Vec2::new(0.0, extent.y + METER_GAP),
            size: Vec2::new(extent.x, METER_HEIGHT),
            percentage: percentage.clamp(0.0, 100.0),
        }
    }

    /// Width of the filled portion of the meter in world units.
    #[must_use]
    pub fn filled_width(&self) -> f32 {
        self.size.x * self.percentage / 100.0
    }
}

/// Pulsing overlay shown while the warning latch is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarningIndicator {
    /// Center of the indicator in world units.
    pub center: Vec2,
    /// Indicator radius in world units.
    pub radius: f32,
    /// Accent color of the indicator.
    pub color: Color,
}

impl WarningIndicator {
    fn centered_on(grid: &GridPresentation) -> Self {
        Self {
            center: grid.origin + grid.extent() / 2.0,
            radius: grid.cell_edge * 2.0,
            color: WARNING_COLOR,
        }
    }
}

/// Presentation seam implemented by concrete backends.
pub trait RenderingBackend {
    /// Presents the provided scene to the user.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_sim_core::FlowState;

    fn snapshot(edge: u32, filled: u32, warning_crossed: bool) -> TankSnapshot {
        let capacity = (edge * edge) as usize;
        let mut cells = vec![false; capacity];
        for cell in cells.iter_mut().take(filled as usize) {
            *cell = true;
        }

        TankSnapshot {
            size: GridSize::new(edge),
            cells,
            filled,
            phase: FillPhase::Filling,
            flow: FlowState::Running,
            warning_crossed,
            elapsed: Duration::ZERO,
            time_budget: None,
        }
    }

    #[test]
    fn scene_meter_tracks_the_fill_percentage() {
        let scene = Scene::from_snapshot(&snapshot(10, 25, false));

        assert!((scene.meter.percentage - 25.0).abs() < f32::EPSILON);
        let expected_width = scene.grid.extent().x / 4.0;
        assert!((scene.meter.filled_width() - expected_width).abs() < 0.001);
        assert!(scene.warning.is_none());
    }

    #[test]
    fn warning_indicator_sits_at_the_grid_center() {
        let scene = Scene::from_snapshot(&snapshot(10, 80, true));

        let indicator = scene.warning.expect("warning latch produces indicator");
        let expected = scene.grid.origin + scene.grid.extent() / 2.0;
        assert_eq!(indicator.center, expected);
        assert_eq!(indicator.color, WARNING_COLOR);
    }

    #[test]
    fn grid_presentation_mirrors_cell_states() {
        let scene = Scene::from_snapshot(&snapshot(3, 2, false));

        assert!(scene.grid.is_filled(CellCoord::new(0, 0)));
        assert!(scene.grid.is_filled(CellCoord::new(1, 0)));
        assert!(!scene.grid.is_filled(CellCoord::new(2, 0)));
        assert!(!scene.grid.is_filled(CellCoord::new(5, 5)));
    }

    #[test]
    fn cell_centers_are_spaced_by_the_cell_edge() {
        let scene = Scene::from_snapshot(&snapshot(4, 0, false));

        let first = scene.grid.cell_center(CellCoord::new(0, 0));
        let second = scene.grid.cell_center(CellCoord::new(1, 0));
        assert!((second.x - first.x - CELL_EDGE).abs() < f32::EPSILON);
        assert!((first.x - CELL_EDGE / 2.0).abs() < f32::EPSILON);
    }
}
