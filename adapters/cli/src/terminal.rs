//! Terminal presentation backend that draws scenes as character rows.

use std::io::{self, Write};

use anyhow::Result;
use tank_sim_core::{CellCoord, FillPhase, FlowState};
use tank_sim_rendering::{RenderingBackend, Scene};

const FILLED_GLYPH: char = '~';
const EMPTY_GLYPH: char = '.';

/// Draws tank scenes onto any writer, one frame per call.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
}

impl TerminalBackend<io::Stdout> {
    /// Creates a backend writing to standard output.
    #[must_use]
    pub(crate) fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBackend<W> {
    /// Creates a backend writing to the provided sink.
    #[must_use]
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        let edge = scene.grid.size.get();

        writeln!(self.out)?;
        for row in 0..edge {
            let mut line = String::with_capacity(edge as usize + 2);
            line.push('|');
            for column in 0..edge {
                let filled = scene.grid.is_filled(CellCoord::new(column, row));
                line.push(if filled { FILLED_GLYPH } else { EMPTY_GLYPH });
            }
            line.push('|');
            writeln!(self.out, "{line}")?;
        }

        let width = edge.max(1) as usize;
        let filled_slots = ((scene.meter.percentage / 100.0 * width as f32).round() as usize)
            .min(width);
        let mut bar = String::with_capacity(width);
        for slot in 0..width {
            bar.push(if slot < filled_slots { '#' } else { ' ' });
        }
        writeln!(self.out, "[{bar}] {:.1}%", scene.meter.percentage)?;

        let mut status = format!(
            "phase: {}  flow: {}",
            phase_label(scene.phase),
            flow_label(scene.flow)
        );
        if let Some(remaining) = scene.remaining_time {
            status.push_str(&format!("  remaining: {:.1}s", remaining.as_secs_f32()));
        }
        writeln!(self.out, "{status}")?;

        if scene.warning.is_some() {
            writeln!(self.out, "(!) nearing capacity")?;
        }

        Ok(())
    }
}

fn phase_label(phase: FillPhase) -> &'static str {
    match phase {
        FillPhase::Empty => "empty",
        FillPhase::Filling => "filling",
        FillPhase::Warning => "warning",
        FillPhase::Full => "full",
    }
}

fn flow_label(flow: FlowState) -> &'static str {
    match flow {
        FlowState::Running => "running",
        FlowState::Paused => "paused",
    }
}
