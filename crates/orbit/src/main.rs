use std::fs::{self, File};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use color_eyre::eyre::{WrapErr, eyre};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use orbit_backdrop::BackdropState;
use orbit_config::{Config, LoggingConfig};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Stylize},
    text::Line,
};
use tracing::{info, level_filters::LevelFilter, warn};

/// Frame interval; also the event poll timeout.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load().wrap_err("failed to load configuration")?;
    init_logging(&config.logging)?;

    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    ratatui::restore();
    result
}

/// Send log output to a file so it never lands on the alternate screen.
/// A level of "off" installs nothing.
fn init_logging(logging: &LoggingConfig) -> color_eyre::Result<()> {
    let level: LevelFilter = logging
        .level
        .parse()
        .map_err(|_| eyre!("invalid log level {:?}", logging.level))?;
    if level == LevelFilter::OFF {
        return Ok(());
    }

    let path = logging.file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(&path).wrap_err_with(|| format!("failed to open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

/// The main application which holds the state and logic of the application.
pub struct App {
    /// Is the application running?
    running: bool,
    /// Is the animation clock frozen?
    paused: bool,
    config: Config,
    backdrop: Option<BackdropState>,
    /// Wall clock at start, adjusted for time spent paused.
    started: Instant,
    /// When the current pause began.
    paused_at: Option<Instant>,
    /// Last known terminal size in cells.
    size: (u16, u16),
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        Self {
            running: false,
            paused: false,
            config,
            backdrop: None,
            started: Instant::now(),
            paused_at: None,
            size: (0, 0),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let size = terminal.size()?;
        self.size = (size.width, size.height);
        self.mount();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }

        if let Some(mut backdrop) = self.backdrop.take() {
            backdrop.unmount();
        }
        self.save_preferences();
        Ok(())
    }

    /// Milliseconds of animation time. Stands still while paused.
    fn elapsed_ms(&self) -> u64 {
        let now = self.paused_at.unwrap_or_else(Instant::now);
        now.saturating_duration_since(self.started).as_millis() as u64
    }

    fn mount(&mut self) {
        if let Some(mut old) = self.backdrop.take() {
            old.unmount();
        }
        let (cols, rows) = self.size;
        let now_ms = self.elapsed_ms();
        self.backdrop = Some(BackdropState::mount(&self.config, cols, rows, now_ms));
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let elapsed_ms = self.elapsed_ms();
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.render(frame, elapsed_ms);
        }

        let chunks =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(frame.area());
        let accent = Color::Rgb(0xbf, 0xc8, 0xc8);
        let mut help = vec![
            "q".bold().fg(accent),
            " quit  ".dark_gray(),
            "r".bold().fg(accent),
            " regenerate  ".dark_gray(),
            "a".bold().fg(accent),
            " aurora  ".dark_gray(),
            "o".bold().fg(accent),
            " orbits  ".dark_gray(),
            "s".bold().fg(accent),
            format!(" speed: {}  ", self.config.animation_speed.label()).dark_gray(),
            "p".bold().fg(accent),
            " pause".dark_gray(),
        ];
        if self.paused {
            help.push("  [paused]".fg(accent));
        }
        frame.render_widget(Line::from(help).centered(), chunks[1]);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls with the frame interval so the animation keeps moving.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(cols, rows) => {
                    self.size = (cols, rows);
                    if let Some(backdrop) = self.backdrop.as_mut() {
                        backdrop.resize(cols, rows);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('r')) => self.remount(),
            (_, KeyCode::Char('a')) => self.toggle_aurora(),
            (_, KeyCode::Char('o')) => self.toggle_orbits(),
            (_, KeyCode::Char('s')) => self.cycle_speed(),
            (_, KeyCode::Char('p')) => self.toggle_pause(),
            _ => {}
        }
    }

    /// Throw the current layout away and generate a new one.
    fn remount(&mut self) {
        self.mount();
        info!("backdrop regenerated");
    }

    fn toggle_aurora(&mut self) {
        self.config.show_aurora = !self.config.show_aurora;
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.set_show_aurora(self.config.show_aurora);
        }
    }

    fn toggle_orbits(&mut self) {
        self.config.show_orbits = !self.config.show_orbits;
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.set_show_orbits(self.config.show_orbits);
        }
    }

    fn cycle_speed(&mut self) {
        self.config.animation_speed = self.config.animation_speed.next();
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.set_speed(self.config.animation_speed);
        }
    }

    fn toggle_pause(&mut self) {
        match self.paused_at.take() {
            Some(paused_at) => {
                self.started += paused_at.elapsed();
                self.paused = false;
            }
            None => {
                self.paused_at = Some(Instant::now());
                self.paused = true;
            }
        }
    }

    /// Persist the toggles. A failed save is logged, not fatal.
    fn save_preferences(&self) {
        if let Err(err) = self.config.save() {
            warn!(%err, "failed to save preferences");
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
