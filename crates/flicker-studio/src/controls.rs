use flicker_engine::input::{Key, KeyPress};

use crate::grid::{GridCommand, GridConfig, Swatch, MAX_SURFACE_EXTENT};

pub const MIN_FPS: f64 = 1.0;
pub const MAX_FPS: f64 = 1000.0;
pub const MAX_CELLS: u32 = 256;
pub const MAX_CELL_SIZE: u32 = 512;
pub const CELL_SIZE_STEP: i64 = 4;

/// Colors cycled by the color keys.
pub const PALETTE: [&str; 8] = [
    "#000000", "#ffffff", "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#00ffff", "#ff00ff",
];

/// A keyboard intent, before bounds are applied.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Control {
    AdjustFps(i32),
    AdjustCols(i32),
    AdjustRows(i32),
    AdjustCellSize(i32),
    CycleColor1,
    CycleColor2,
    TogglePause,
    Exit,
}

impl Control {
    /// Maps a key press to a control. Repeats are accepted so held keys keep stepping.
    pub fn from_press(press: &KeyPress) -> Option<Self> {
        let fps_step = if press.modifiers.shift { 10 } else { 1 };
        let control = match press.key {
            Key::ArrowUp => Control::AdjustFps(fps_step),
            Key::ArrowDown => Control::AdjustFps(-fps_step),
            Key::ArrowRight => Control::AdjustCols(1),
            Key::ArrowLeft => Control::AdjustCols(-1),
            Key::PageUp => Control::AdjustRows(1),
            Key::PageDown => Control::AdjustRows(-1),
            Key::X => Control::AdjustCellSize(CELL_SIZE_STEP as i32),
            Key::Z => Control::AdjustCellSize(-(CELL_SIZE_STEP as i32)),
            Key::Digit1 => Control::CycleColor1,
            Key::Digit2 => Control::CycleColor2,
            Key::Space if !press.repeat => Control::TogglePause,
            Key::Escape => Control::Exit,
            _ => return None,
        };
        Some(control)
    }
}

/// What the application must do for one control.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetRate(f64),
    Grid(GridCommand),
    Pause,
    Resume,
    Exit,
}

/// Target rate and pause state owned by the keyboard layer.
#[derive(Debug, Clone)]
pub struct Controls {
    fps: f64,
    paused: bool,
}

impl Controls {
    pub fn new(fps: f64) -> Self {
        Self { fps, paused: false }
    }

    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Resolves a control against the current grid. Returns `None` when the value
    /// is already at its bound.
    ///
    /// Changing the rate re-arms the governor, so it also ends a pause.
    pub fn apply(&mut self, control: Control, grid: &GridConfig) -> Option<Effect> {
        match control {
            Control::AdjustFps(delta) => {
                let fps = (self.fps + delta as f64).clamp(MIN_FPS, MAX_FPS);
                if fps == self.fps && !self.paused {
                    return None;
                }
                self.fps = fps;
                self.paused = false;
                Some(Effect::SetRate(fps))
            }
            Control::AdjustCols(delta) => {
                let max = MAX_CELLS.min(MAX_SURFACE_EXTENT / grid.cell_size.max(1));
                step(grid.cols, delta as i64, max).map(|v| Effect::Grid(GridCommand::SetCols(v)))
            }
            Control::AdjustRows(delta) => {
                let max = MAX_CELLS.min(MAX_SURFACE_EXTENT / grid.cell_size.max(1));
                step(grid.rows, delta as i64, max).map(|v| Effect::Grid(GridCommand::SetRows(v)))
            }
            Control::AdjustCellSize(delta) => {
                let max = MAX_CELL_SIZE.min(MAX_SURFACE_EXTENT / grid.rows.max(grid.cols).max(1));
                step(grid.cell_size, delta as i64, max)
                    .map(|v| Effect::Grid(GridCommand::SetCellSize(v)))
            }
            Control::CycleColor1 => {
                Some(Effect::Grid(GridCommand::SetColor1(next_swatch(&grid.color1))))
            }
            Control::CycleColor2 => {
                Some(Effect::Grid(GridCommand::SetColor2(next_swatch(&grid.color2))))
            }
            Control::TogglePause => {
                self.paused = !self.paused;
                Some(if self.paused { Effect::Pause } else { Effect::Resume })
            }
            Control::Exit => Some(Effect::Exit),
        }
    }
}

/// Applies `delta` within `1..=max`. A positive step never lowers the value.
fn step(current: u32, delta: i64, max: u32) -> Option<u32> {
    let next = (current as i64 + delta).clamp(1, max.max(1) as i64) as u32;
    if delta > 0 && next <= current {
        return None;
    }
    (next != current).then_some(next)
}

/// Next palette entry after `current`; unknown colors restart at the first entry.
pub fn next_swatch(current: &Swatch) -> Swatch {
    let swatches: Vec<Swatch> = PALETTE
        .iter()
        .filter_map(|hex| Swatch::parse(hex).ok())
        .collect();

    let next = swatches
        .iter()
        .position(|s| s.color() == current.color())
        .map_or(0, |i| (i + 1) % swatches.len());

    swatches[next].clone()
}

#[cfg(test)]
mod tests {
    use flicker_engine::input::Modifiers;

    use super::*;

    fn press(key: Key) -> KeyPress {
        KeyPress { key, modifiers: Modifiers::NONE, repeat: false }
    }

    fn grid() -> GridConfig {
        GridConfig {
            cell_size: 48,
            rows: 8,
            cols: 8,
            color1: Swatch::parse("#000000").unwrap(),
            color2: Swatch::parse("#ffffff").unwrap(),
        }
    }

    #[test]
    fn key_bindings() {
        assert_eq!(Control::from_press(&press(Key::ArrowUp)), Some(Control::AdjustFps(1)));
        assert_eq!(Control::from_press(&press(Key::PageDown)), Some(Control::AdjustRows(-1)));
        assert_eq!(Control::from_press(&press(Key::Z)), Some(Control::AdjustCellSize(-4)));
        assert_eq!(Control::from_press(&press(Key::Digit2)), Some(Control::CycleColor2));
        assert_eq!(Control::from_press(&press(Key::Escape)), Some(Control::Exit));
        assert_eq!(Control::from_press(&press(Key::Enter)), None);
    }

    #[test]
    fn shift_steps_fps_by_ten() {
        let p = KeyPress { key: Key::ArrowDown, modifiers: Modifiers::SHIFT, repeat: false };
        assert_eq!(Control::from_press(&p), Some(Control::AdjustFps(-10)));
    }

    #[test]
    fn held_space_does_not_toggle_repeatedly() {
        let p = KeyPress { key: Key::Space, modifiers: Modifiers::NONE, repeat: true };
        assert_eq!(Control::from_press(&p), None);
    }

    #[test]
    fn fps_has_a_floor_of_one() {
        let mut c = Controls::new(5.0);
        assert_eq!(c.apply(Control::AdjustFps(-10), &grid()), Some(Effect::SetRate(1.0)));
        assert_eq!(c.apply(Control::AdjustFps(-1), &grid()), None);
        assert_eq!(c.fps(), 1.0);
    }

    #[test]
    fn grid_steps_are_bounded() {
        let mut c = Controls::new(30.0);
        let mut g = grid();
        g.cols = 1;
        assert_eq!(c.apply(Control::AdjustCols(-1), &g), None);
        assert_eq!(
            c.apply(Control::AdjustCols(1), &g),
            Some(Effect::Grid(GridCommand::SetCols(2)))
        );

        g.cell_size = 3;
        assert_eq!(
            c.apply(Control::AdjustCellSize(-4), &g),
            Some(Effect::Grid(GridCommand::SetCellSize(1)))
        );
    }

    #[test]
    fn grid_growth_stops_at_the_surface_limit() {
        let mut c = Controls::new(30.0);
        let mut g = grid();
        g.cols = MAX_SURFACE_EXTENT / g.cell_size;
        assert_eq!(c.apply(Control::AdjustCols(1), &g), None);
        assert_eq!(
            c.apply(Control::AdjustCols(-1), &g),
            Some(Effect::Grid(GridCommand::SetCols(g.cols - 1)))
        );

        g.cols = 100;
        g.cell_size = 40;
        assert_eq!(c.apply(Control::AdjustCellSize(4), &g), None);
        assert_eq!(
            c.apply(Control::AdjustCellSize(-4), &g),
            Some(Effect::Grid(GridCommand::SetCellSize(36)))
        );

        g.rows = MAX_SURFACE_EXTENT / 40;
        assert_eq!(c.apply(Control::AdjustRows(1), &g), None);
    }

    #[test]
    fn pause_toggles_and_rate_change_resumes() {
        let mut c = Controls::new(30.0);
        assert_eq!(c.apply(Control::TogglePause, &grid()), Some(Effect::Pause));
        assert!(c.is_paused());

        assert_eq!(c.apply(Control::AdjustFps(1), &grid()), Some(Effect::SetRate(31.0)));
        assert!(!c.is_paused());

        c.apply(Control::TogglePause, &grid());
        assert_eq!(c.apply(Control::TogglePause, &grid()), Some(Effect::Resume));
    }

    #[test]
    fn palette_cycles_and_wraps() {
        let black = Swatch::parse("#000000").unwrap();
        assert_eq!(next_swatch(&black).label(), "#ffffff");

        let last = Swatch::parse(PALETTE[PALETTE.len() - 1]).unwrap();
        assert_eq!(next_swatch(&last).label(), "#000000");

        let custom = Swatch::parse("#123456").unwrap();
        assert_eq!(next_swatch(&custom).label(), "#000000");
    }
}
