//! Blocktris — classic falling-block puzzle game in the terminal.

mod app;
mod game;
mod input;
mod theme;
mod ui;

use anyhow::{bail, Result};
use app::App;
use clap::{Parser, ValueEnum};
use game::{GridSize, BLOCK_SIZE, HEIGHT, WIDTH};
use std::time::Duration;

/// Accepted `--tick-rate` range, in steps per second.
const MIN_TICK_RATE: f64 = 0.1;
const MAX_TICK_RATE: f64 = 1000.0;

/// Options derived from CLI that affect game behaviour (grid size, speed, randomness).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub size: GridSize,
    /// Time between gravity steps.
    pub tick_interval: Duration,
    pub seed: u64,
    pub show_data: bool,
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let derived = GridSize::from_pixels(WIDTH, HEIGHT, BLOCK_SIZE)?;
        let size = GridSize::new(
            args.cols.unwrap_or(derived.width() as u16),
            args.rows.unwrap_or(derived.height() as u16),
        )?;
        if !(MIN_TICK_RATE..=MAX_TICK_RATE).contains(&args.tick_rate) {
            bail!(
                "tick rate must be between {MIN_TICK_RATE} and {MAX_TICK_RATE}, got {}",
                args.tick_rate
            );
        }
        let tick_interval = Duration::try_from_secs_f64(1.0 / args.tick_rate)?;
        Ok(Self {
            size,
            tick_interval,
            seed: args.seed.unwrap_or_else(rand::random),
            show_data: args.show_data,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig::from_args(&args)?;
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// Classic falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blocktris",
    version,
    about = "Falling-block puzzle in the terminal. Fill a row edge to edge to clear it.",
    long_about = "Blocktris is a small terminal take on the classic falling-block game.\n\n\
        Pieces fall one row per tick. Complete a row to clear it and score a point. \
        If a new piece has nowhere to go, the board and score are wiped and play continues.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move    Up or k  Rotate    Down or j  Soft drop\n  \
        q  Toggle FPS / position overlay    Esc or Ctrl+C  Quit"
)]
pub struct Args {
    /// Grid width in cells. Defaults to 300 px / 30 px = 10.
    #[arg(long, value_name = "COLS")]
    pub cols: Option<u16>,

    /// Grid height in cells. Defaults to 600 px / 30 px = 20.
    #[arg(long, value_name = "ROWS")]
    pub rows: Option<u16>,

    /// Game steps per second (one gravity attempt per step).
    #[arg(long, default_value = "10.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Seed for piece and colour selection. Random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Start with the FPS / position overlay visible.
    #[arg(long)]
    pub show_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
