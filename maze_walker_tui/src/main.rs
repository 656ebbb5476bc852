use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use maze_walker_core::{
    Element, Level, MapParser, Player, StepOutcome, WalkerConfig,
    pilot::{Pilot, PilotView, PlanningPilot, RandomPilot},
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE", default_value = "maps/level01.txt")]
    map: PathBuf,

    /// Optional TOML file with walker settings
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Who steers the player
    #[arg(short, long, value_enum, default_value_t = PilotKind::Planner)]
    pilot: PilotKind,

    /// Seed for the random pilot
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Parse the map, print a summary and exit
    #[arg(long)]
    check: bool,

    /// Directory for the log file (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PilotKind {
    Random,
    Planner,
}

struct App {
    level: Level,
    player: Player,
    pilot: Box<dyn Pilot>,
    config: WalkerConfig,
    /// Ticks simulated so far.
    ticks: u64,
    last_outcome: StepOutcome,
    /// Flag to control the main loop.
    should_quit: bool,
    /// Set once the player stands on a finish cell.
    finished: bool,
}

impl App {
    fn new(level: Level, config: WalkerConfig, pilot: Box<dyn Pilot>) -> Result<Self> {
        let player = Player::spawn(&level).context("Cannot place the player")?;
        Ok(App {
            level,
            player,
            pilot,
            config,
            ticks: 0,
            last_outcome: StepOutcome::Idle,
            should_quit: false,
            finished: false,
        })
    }

    /// Handles one step of the simulation.
    fn tick(&mut self) {
        if self.finished {
            return;
        }
        let movement = self.pilot.next_movement(&PilotView {
            level: &self.level,
            player: &self.player,
            config: &self.config,
        });
        self.last_outcome = self.player.step(movement, &self.level, &self.config);
        self.ticks += 1;
        if self.last_outcome == StepOutcome::Finished {
            info!(ticks = self.ticks, "reached the finish");
            self.finished = true;
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_dir.as_deref(), args.check)?;

    let config = match &args.config {
        Some(path) => WalkerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => WalkerConfig::default(),
    };
    let map = MapParser::parse_file(&args.map)
        .with_context(|| format!("Failed to load map {}", args.map.display()))?;
    let level = Level::with_key_elevation(map, config.key_elevation);

    if args.check {
        print_summary(&args.map, &level);
        return Ok(());
    }

    let pilot: Box<dyn Pilot> = match args.pilot {
        PilotKind::Random => Box::new(RandomPilot::new(args.seed)),
        PilotKind::Planner => Box::new(PlanningPilot::new()),
    };
    let mut app = App::new(level, config, pilot)?;
    info!(map = %args.map.display(), pilot = ?args.pilot, "starting walk");

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
}

/// Logs go to a file while the terminal UI owns the screen, and to stderr in
/// check mode.
fn init_logging(log_dir: Option<&Path>, to_stderr: bool) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
        return Ok(None);
    }

    let dir = log_dir.map_or_else(|| std::env::temp_dir().join("maze_walker"), Path::to_path_buf);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&dir, "maze_walker.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn print_summary(path: &Path, level: &Level) {
    let map = level.map();
    println!("{}: {}x{}", path.display(), map.width(), map.height());
    match level.start_position() {
        Ok(start) => println!("start: ({}, {})", start.x, start.y),
        Err(err) => println!("start: {err}"),
    }
    println!("keys: {}", level.keys().len());
    println!("doors: {}", level.doors().len());

    let finishes = level.finish_cells();
    println!("finish cells: {}", finishes.len());
    let reachable = level.start_position().ok().and_then(|start| {
        let start = level.cell_at(start.x, start.y)?;
        finishes
            .iter()
            .filter_map(|&goal| PlanningPilot::a_star_path(level, start, goal))
            .map(|path| path.len() - 1)
            .min()
    });
    match reachable {
        Some(steps) => println!("finish reachable in {steps} steps"),
        None => println!("finish not reachable"),
    }
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(app.config.tick_ms);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    app.quit();
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Area for the map
            Constraint::Length(3), // Area for the status line
            Constraint::Length(2), // Area for help
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], app);
    render_status(frame, main_layout[1], app);

    let help_text = Paragraph::new("Press 'q' or 'Esc' to quit.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Door and key colours, indexed by id.
fn id_color(id: usize) -> Color {
    const PALETTE: [Color; 5] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Magenta,
    ];
    PALETTE[id % PALETTE.len()]
}

/// Arrow for the player's heading. Rows grow downwards on screen, like y.
fn heading_glyph(player: &Player) -> &'static str {
    let (dx, dy) = player.direction();
    if dx.abs() >= dy.abs() {
        if dx < 0.0 { "<" } else { ">" }
    } else if dy < 0.0 {
        "^"
    } else {
        "v"
    }
}

/// Renders the level from above onto the frame.
fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let map = app.level.map();
    let player_cell = app.player.cell(&app.level);

    let mut lines: Vec<Line> = Vec::with_capacity(map.height());
    for y in 0..map.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(map.width());
        for x in 0..map.width() {
            if player_cell.is_some_and(|cell| cell.x == x && cell.y == y) {
                spans.push(Span::styled(
                    heading_glyph(&app.player),
                    Style::default().fg(Color::Cyan).bold(),
                ));
                continue;
            }
            let span = match map.element(x, y) {
                Element::Empty | Element::Start => Span::raw(" "),
                Element::Wall => Span::styled("#", Style::default().fg(Color::DarkGray)),
                Element::Finish => Span::styled("G", Style::default().fg(Color::Green).bold()),
                Element::Door { id } => Span::styled("|", Style::default().fg(id_color(id))),
                Element::Key { id } => Span::styled("k", Style::default().fg(id_color(id))),
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Maze Walker").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}

/// Renders the player's position and the latest step result.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let position = app.player.position;
    let state = if app.finished {
        Span::styled("Finished!", Style::default().fg(Color::Green).bold())
    } else {
        Span::raw(format!("{:?}", app.last_outcome))
    };
    let status = Line::from(vec![
        Span::raw(format!(
            "Pos: ({:.2}, {:.2}) Heading: {:.2} rad Tick: {} Keys in level: {} ",
            position.x,
            position.y,
            app.player.angle,
            app.ticks,
            app.level.keys().len()
        )),
        state,
    ]);

    let status_widget =
        Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status_widget, area);
}
