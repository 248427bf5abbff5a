use std::fmt;

use flicker_engine::coords::Rect;
use flicker_engine::paint::{Color, ParseColorError};
use flicker_engine::scene::DrawList;
use flicker_engine::time::RenderCallback;

/// A color together with the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    label: String,
    color: Color,
}

impl Swatch {
    pub fn parse(s: &str) -> Result<Self, ParseColorError> {
        let color = Color::from_hex(s)?;
        let label = s.trim();
        let label = if label.starts_with('#') {
            label.to_ascii_lowercase()
        } else {
            format!("#{}", label.to_ascii_lowercase())
        };
        Ok(Self { label, color })
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Largest window edge, in logical pixels, a grid may ask for.
///
/// At a 2x scale factor this stays within the 8192 px texture limit most adapters
/// report.
pub const MAX_SURFACE_EXTENT: u32 = 4096;

/// Grid geometry and colors.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Cell edge in logical pixels.
    pub cell_size: u32,
    pub rows: u32,
    pub cols: u32,
    pub color1: Swatch,
    pub color2: Swatch,
}

impl GridConfig {
    /// Surface size `(width, height)` in logical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        (
            self.cell_size.saturating_mul(self.cols),
            self.cell_size.saturating_mul(self.rows),
        )
    }

    /// Whether the surface fits within [`MAX_SURFACE_EXTENT`] on both axes.
    pub fn fits(&self) -> bool {
        let (w, h) = self.surface_size();
        w <= MAX_SURFACE_EXTENT && h <= MAX_SURFACE_EXTENT
    }
}

/// Explicit painter mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum GridCommand {
    SetCellSize(u32),
    SetRows(u32),
    SetCols(u32),
    SetColor1(Swatch),
    SetColor2(Swatch),
}

/// Two-color checkerboard that swaps its colors on every render.
///
/// Each render records one solid rect per cell into a retained draw list. The list
/// stays on screen until the next render, so ticks the governor skips re-present
/// the previous pattern.
#[derive(Debug)]
pub struct GridPainter {
    config: GridConfig,
    color_switch: bool,
    drawing: DrawList,
    renders: u64,
}

impl GridPainter {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            color_switch: false,
            drawing: DrawList::new(),
            renders: 0,
        }
    }

    /// Records the pattern for the current phase, then flips the phase.
    pub fn paint(&mut self) {
        let (first, second) = if self.color_switch {
            (self.config.color1.color(), self.config.color2.color())
        } else {
            (self.config.color2.color(), self.config.color1.color())
        };

        let cell = self.config.cell_size as f32;
        self.drawing.clear();
        for i in 0..self.config.cols {
            for j in 0..self.config.rows {
                let color = if (i + j) % 2 == 1 { first } else { second };
                self.drawing.push_solid_rect(Rect::grid_cell(i, j, cell), color);
            }
        }

        self.color_switch = !self.color_switch;
        self.renders += 1;
    }

    /// Applies one mutation. The surface is resized and the drawing cleared even
    /// when the value did not change; the next accepted tick repaints.
    pub fn apply(&mut self, cmd: GridCommand) {
        match cmd {
            GridCommand::SetCellSize(v) => self.config.cell_size = v,
            GridCommand::SetRows(v) => self.config.rows = v,
            GridCommand::SetCols(v) => self.config.cols = v,
            GridCommand::SetColor1(s) => self.config.color1 = s,
            GridCommand::SetColor2(s) => self.config.color2 = s,
        }
        self.drawing.clear();
    }

    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[inline]
    pub fn surface_size(&self) -> (u32, u32) {
        self.config.surface_size()
    }

    #[inline]
    pub fn draw_list(&self) -> &DrawList {
        &self.drawing
    }

    /// Phase used by the next render: `true` means color1 fills odd cells.
    #[inline]
    pub fn color_switch(&self) -> bool {
        self.color_switch
    }

    #[inline]
    pub fn renders(&self) -> u64 {
        self.renders
    }
}

impl RenderCallback for GridPainter {
    fn render(&mut self) {
        self.paint();
    }
}
