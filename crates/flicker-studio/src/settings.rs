use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use flicker_engine::time::{HostPeriod, DEFAULT_HOST_RATE_HZ};

use crate::error::SetupError;
use crate::grid::{GridConfig, Swatch, MAX_SURFACE_EXTENT};

pub const DEFAULT_FPS: f64 = 30.0;
pub const DEFAULT_CELL_SIZE: u32 = 48;
pub const DEFAULT_ROWS: u32 = 8;
pub const DEFAULT_COLS: u32 = 8;
pub const DEFAULT_COLOR1: &str = "#000000";
pub const DEFAULT_COLOR2: &str = "#ffffff";

/// Grid flicker test pattern with a frame-rate governor.
#[derive(Debug, Default, Parser)]
#[command(name = "flicker", version, about)]
pub struct Cli {
    /// TOML settings file. When given it must define every control not set here.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target frames per second.
    #[arg(long)]
    pub fps: Option<f64>,

    /// Cell edge in logical pixels.
    #[arg(long)]
    pub cell_size: Option<u32>,

    #[arg(long)]
    pub rows: Option<u32>,

    #[arg(long)]
    pub cols: Option<u32>,

    /// First color as #rrggbb.
    #[arg(long)]
    pub color1: Option<String>,

    /// Second color as #rrggbb.
    #[arg(long)]
    pub color2: Option<String>,

    /// Nominal display refresh rate in Hz.
    #[arg(long, value_name = "HZ")]
    pub host_rate: Option<f64>,

    /// Trust the nominal refresh rate instead of measuring tick deltas.
    #[arg(long)]
    pub fixed_host_period: bool,

    /// Log filter in env_logger syntax, e.g. "debug" or "flicker_engine::time=trace".
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

/// On-disk settings. Every field is optional so missing controls can be reported
/// by name instead of as a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    #[serde(default)]
    pub controls: ControlsSection,
    #[serde(default)]
    pub host: HostSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlsSection {
    pub fps: Option<f64>,
    pub cell_size: Option<u32>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub color1: Option<String>,
    pub color2: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSection {
    pub refresh_rate: Option<f64>,
    pub measure: Option<bool>,
}

impl FileSettings {
    pub fn read(path: &Path) -> Result<Self, SetupError> {
        let text = fs::read_to_string(path).map_err(|source| SetupError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, SetupError> {
        toml::from_str(text).map_err(|source| SetupError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostSettings {
    pub refresh_rate: f64,
    pub measure: bool,
}

impl HostSettings {
    pub fn period(&self) -> HostPeriod {
        if self.measure {
            HostPeriod::measured(self.refresh_rate)
        } else {
            HostPeriod::fixed(self.refresh_rate)
        }
    }
}

/// Effective settings after merging the command line, the file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub fps: f64,
    pub grid: GridConfig,
    pub host: HostSettings,
}

impl Settings {
    /// Reads the config file named by `cli`, if any, and resolves.
    pub fn load(cli: &Cli) -> Result<Self, SetupError> {
        let file = cli.config.as_deref().map(FileSettings::read).transpose()?;
        Self::resolve(cli, file.as_ref())
    }

    /// Command line wins over the file. Built-in defaults apply only when there is
    /// no file; a file that leaves a control undefined is an error.
    pub fn resolve(cli: &Cli, file: Option<&FileSettings>) -> Result<Self, SetupError> {
        let controls = file.map(|f| &f.controls);

        let fps = pick("fps", cli.fps, controls.map(|c| c.fps), DEFAULT_FPS)?;
        let cell_size = pick(
            "cell_size",
            cli.cell_size,
            controls.map(|c| c.cell_size),
            DEFAULT_CELL_SIZE,
        )?;
        let rows = pick("rows", cli.rows, controls.map(|c| c.rows), DEFAULT_ROWS)?;
        let cols = pick("cols", cli.cols, controls.map(|c| c.cols), DEFAULT_COLS)?;
        let color1 = pick(
            "color1",
            cli.color1.clone(),
            controls.map(|c| c.color1.clone()),
            DEFAULT_COLOR1.to_string(),
        )?;
        let color2 = pick(
            "color2",
            cli.color2.clone(),
            controls.map(|c| c.color2.clone()),
            DEFAULT_COLOR2.to_string(),
        )?;

        for (name, value) in [("cell_size", cell_size), ("rows", rows), ("cols", cols)] {
            if value == 0 {
                return Err(SetupError::InvalidValue {
                    name,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        let grid = GridConfig {
            cell_size,
            rows,
            cols,
            color1: swatch("color1", &color1)?,
            color2: swatch("color2", &color2)?,
        };
        if !grid.fits() {
            let (w, h) = grid.surface_size();
            return Err(SetupError::InvalidValue {
                name: "grid",
                reason: format!("{w}x{h} px exceeds {MAX_SURFACE_EXTENT} px per side"),
            });
        }

        let host_section = file.map(|f| &f.host);
        let refresh_rate = cli
            .host_rate
            .or(host_section.and_then(|h| h.refresh_rate))
            .unwrap_or(DEFAULT_HOST_RATE_HZ);
        if !(refresh_rate.is_finite() && refresh_rate > 0.0) {
            return Err(SetupError::InvalidValue {
                name: "host_rate",
                reason: format!("{refresh_rate} is not a positive rate"),
            });
        }
        let measure =
            !cli.fixed_host_period && host_section.and_then(|h| h.measure).unwrap_or(true);

        Ok(Self {
            fps,
            grid,
            host: HostSettings {
                refresh_rate,
                measure,
            },
        })
    }
}

/// `file` is `None` when no config file was given, `Some(None)` when the file
/// lacks the control.
fn pick<T>(name: &'static str, cli: Option<T>, file: Option<Option<T>>, default: T) -> Result<T, SetupError> {
    match (cli, file) {
        (Some(v), _) => Ok(v),
        (None, Some(Some(v))) => Ok(v),
        (None, Some(None)) => Err(SetupError::MissingControl { name }),
        (None, None) => Ok(default),
    }
}

fn swatch(name: &'static str, value: &str) -> Result<Swatch, SetupError> {
    Swatch::parse(value).map_err(|source| SetupError::InvalidColor { name, source })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    const FULL: &str = r##"
        [controls]
        fps = 24
        cell_size = 32
        rows = 4
        cols = 6
        color1 = "#ff0000"
        color2 = "#0000ff"

        [host]
        refresh_rate = 144.0
        measure = false
    "##;

    fn file(text: &str) -> FileSettings {
        FileSettings::parse(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_without_file() {
        let s = Settings::resolve(&Cli::default(), None).unwrap();
        assert_eq!(s.fps, DEFAULT_FPS);
        assert_eq!(s.grid.surface_size(), (384, 384));
        assert_eq!(s.grid.color2.label(), "#ffffff");
        assert_eq!(s.host, HostSettings { refresh_rate: 60.0, measure: true });
    }

    #[test]
    fn file_values_are_used() {
        let f = file(FULL);
        let s = Settings::resolve(&Cli::default(), Some(&f)).unwrap();
        assert_eq!(s.fps, 24.0);
        assert_eq!((s.grid.cell_size, s.grid.rows, s.grid.cols), (32, 4, 6));
        assert_eq!(s.grid.color1.label(), "#ff0000");
        assert_eq!(s.host, HostSettings { refresh_rate: 144.0, measure: false });
    }

    #[test]
    fn command_line_overrides_file() {
        let f = file(FULL);
        let cli = Cli::try_parse_from(["flicker", "--fps", "12", "--rows", "9", "--host-rate", "75"])
            .unwrap();
        let s = Settings::resolve(&cli, Some(&f)).unwrap();
        assert_eq!(s.fps, 12.0);
        assert_eq!(s.grid.rows, 9);
        assert_eq!(s.grid.cols, 6);
        assert_eq!(s.host.refresh_rate, 75.0);
    }

    #[test]
    fn missing_control_in_file_is_fatal() {
        let f = file("[controls]\nfps = 30\ncell_size = 8\nrows = 2\ncols = 2\ncolor1 = \"#000000\"\n");
        let err = Settings::resolve(&Cli::default(), Some(&f)).unwrap_err();
        assert!(matches!(err, SetupError::MissingControl { name: "color2" }), "{err}");
    }

    #[test]
    fn missing_control_can_come_from_the_command_line() {
        let f = file("[controls]\nfps = 30\ncell_size = 8\nrows = 2\ncols = 2\ncolor1 = \"#000000\"\n");
        let cli = Cli::try_parse_from(["flicker", "--color2", "#00ff00"]).unwrap();
        let s = Settings::resolve(&cli, Some(&f)).unwrap();
        assert_eq!(s.grid.color2.label(), "#00ff00");
    }

    #[test]
    fn empty_file_reports_first_missing_control() {
        let f = file("");
        let err = Settings::resolve(&Cli::default(), Some(&f)).unwrap_err();
        assert!(matches!(err, SetupError::MissingControl { name: "fps" }));
    }

    #[test]
    fn invalid_color_is_rejected() {
        let cli = Cli::try_parse_from(["flicker", "--color1", "red"]).unwrap();
        let err = Settings::resolve(&cli, None).unwrap_err();
        assert!(matches!(err, SetupError::InvalidColor { name: "color1", .. }));
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let cli = Cli::try_parse_from(["flicker", "--cols", "0"]).unwrap();
        let err = Settings::resolve(&cli, None).unwrap_err();
        assert!(matches!(err, SetupError::InvalidValue { name: "cols", .. }));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let cli = Cli::try_parse_from(["flicker", "--cols", "100"]).unwrap();
        let err = Settings::resolve(&cli, None).unwrap_err();
        assert!(matches!(err, SetupError::InvalidValue { name: "grid", .. }), "{err}");

        let cli = Cli::try_parse_from(["flicker", "--cols", "85"]).unwrap();
        assert!(Settings::resolve(&cli, None).is_ok());
    }

    #[test]
    fn fixed_host_flag_wins_over_file() {
        let f = file("[controls]\nfps = 30\ncell_size = 8\nrows = 2\ncols = 2\ncolor1 = \"#000000\"\ncolor2 = \"#ffffff\"\n[host]\nmeasure = true\n");
        let cli = Cli::try_parse_from(["flicker", "--fixed-host-period"]).unwrap();
        let s = Settings::resolve(&cli, Some(&f)).unwrap();
        assert!(!s.host.measure);
        assert!(matches!(s.host.period(), HostPeriod::Fixed { .. }));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = FileSettings::parse("[controls]\nspeed = 3\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, SetupError::Parse { .. }));
    }

    #[test]
    fn unreadable_file_is_reported() {
        let err = FileSettings::read(Path::new("/nonexistent/flicker.toml")).unwrap_err();
        assert!(matches!(err, SetupError::Read { .. }));
    }

    #[test]
    fn fractional_rates_pass_through_unvalidated() {
        let cli = Cli::try_parse_from(["flicker", "--fps", "29.97"]).unwrap();
        let s = Settings::resolve(&cli, None).unwrap();
        assert_eq!(s.fps, 29.97);
    }
}
