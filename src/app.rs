//! App: terminal init, fixed-rate main loop, tick and key handling.

use crate::game::{Step, Tetris};
use crate::input::{key_to_action, Action};
use crate::theme::Theme;
use crate::ui::Hud;
use crate::GameConfig;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ratatui::DefaultTerminal;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frames averaged for the FPS readout.
const FPS_WINDOW: usize = 10;

/// How long the "board reset" notice stays up, in ticks.
const RESET_NOTICE_TICKS: u32 = 20;

/// Rolling frame-rate estimate over the last [`FPS_WINDOW`] frame intervals.
#[derive(Debug, Default)]
struct FpsCounter {
    frames: VecDeque<Instant>,
}

impl FpsCounter {
    fn frame(&mut self, now: Instant) {
        self.frames.push_back(now);
        while self.frames.len() > FPS_WINDOW + 1 {
            self.frames.pop_front();
        }
    }

    fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.front(), self.frames.back()) else {
            return 0.0;
        };
        let span = last.duration_since(*first).as_secs_f64();
        if span <= 0.0 {
            return 0.0;
        }
        (self.frames.len() - 1) as f64 / span
    }
}

pub struct App {
    theme: Theme,
    state: Tetris,
    tick_interval: Duration,
    show_data: bool,
    fps: FpsCounter,
    resets: u32,
    /// Rows cleared over every session, unlike the score.
    lines: u32,
    reset_notice_ticks: u32,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            theme,
            state: Tetris::new(config.size, rng),
            tick_interval: config.tick_interval,
            show_data: config.show_data,
            fps: FpsCounter::default(),
            resets: 0,
            lines: 0,
            reset_notice_ticks: 0,
        }
    }

    /// Apply one key action. Returns false when the player asked to quit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::MoveLeft => {
                self.state.try_shift(-1, 0);
            }
            Action::MoveRight => {
                self.state.try_shift(1, 0);
            }
            Action::SoftDrop => {
                self.state.try_shift(0, 1);
            }
            Action::Rotate => {
                self.state.try_rotate();
            }
            Action::ToggleData => self.show_data = !self.show_data,
            Action::None => {}
        }
        true
    }

    /// One gravity attempt.
    fn tick(&mut self) {
        self.reset_notice_ticks = self.reset_notice_ticks.saturating_sub(1);
        if let Step::Locked(outcome) = self.state.step() {
            self.lines += outcome.lines_cleared;
            if outcome.session_reset {
                self.resets += 1;
                self.reset_notice_ticks = RESET_NOTICE_TICKS;
            }
        }
    }

    fn hud(&self) -> Hud {
        Hud {
            show_data: self.show_data,
            fps: self.fps.fps(),
            resets: self.resets,
            lines: self.lines,
            reset_notice: self.reset_notice_ticks > 0,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let leave = execute!(std::io::stdout(), LeaveAlternateScreen);
        let raw = disable_raw_mode();
        first_error(result, [leave, raw])
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut next_tick = Instant::now() + self.tick_interval;
        loop {
            self.fps.frame(Instant::now());
            let hud = self.hud();
            terminal.draw(|f| crate::ui::draw(f, &self.state, &self.theme, &hud))?;

            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }

            let now = Instant::now();
            if now >= next_tick {
                self.tick();
                next_tick += self.tick_interval;
                // Don't burst-step to catch up after a stall.
                if next_tick < now {
                    next_tick = now + self.tick_interval;
                }
            }
        }
    }
}

/// The loop's error wins, then the restore steps in order. Every step has already run.
fn first_error(result: Result<()>, restore: [std::io::Result<()>; 2]) -> Result<()> {
    result?;
    for step in restore {
        step?;
    }
    Ok(())
}
