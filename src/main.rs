//! boxy - a shaded ASCII cube you can spin with the mouse
//!
//! Controls:
//! - Left drag: rotate the cube
//! - Right drag: point the light
//! - R: Reset orientation
//! - Q, Escape or Ctrl-C: Quit
//!
//! Usage:
//!   boxy                                  - Run interactive mode
//!   boxy snapshot --rows 24 --cols 80     - Print a single frame
//!   boxy check-config --config boxy.yaml  - Validate a configuration file

use anyhow::Context;
use boxy::config::AppConfig;
use boxy::input::{light_from_target, parse_key_event, Action, DragTracker};
use boxy::renderer::{Frame, Renderer};
use boxy::terminal::{install_panic_hook, register_shutdown_signals, TerminalDisplay};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::Event;
use nalgebra::Vector3;
use std::fs::File;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const STATUS_LINE: &str = "[drag] Rotate  [right drag] Light  [R]eset  [Q]uit";

/// Snapshot size when neither the flags nor the terminal provide one
const FALLBACK_SIZE: (i32, i32) = (24, 80);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "boxy")]
#[command(version)]
#[command(about = "Spin a shaded ASCII cube in the terminal")]
struct Cli {
    /// Path to config file (defaults to ./boxy.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Write logs to this file; interactive mode logs nowhere otherwise
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive viewer (default)
    Run,

    /// Render a single frame without taking over the terminal
    Snapshot {
        /// Frame height in rows (defaults to the terminal height)
        #[arg(long, allow_negative_numbers = true)]
        rows: Option<i32>,
        /// Frame width in columns (defaults to the terminal width)
        #[arg(long, allow_negative_numbers = true)]
        cols: Option<i32>,
        /// Drag to apply before rendering, as DX,DY; repeatable
        #[arg(long, value_name = "DX,DY", value_parser = parse_drag, allow_hyphen_values = true)]
        drag: Vec<(f32, f32)>,
        /// Light direction as X,Y,Z
        #[arg(long, value_name = "X,Y,Z", value_parser = parse_light, allow_hyphen_values = true)]
        light: Option<Vector3<f32>>,
        /// Write the frame here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration file
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Run));
    init_logging(cli.log_level, cli.log_file.as_deref(), interactive)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = AppConfig::load_or_default(cli.config.as_deref())?;
            run_interactive(&config)?;
        }
        Commands::Snapshot {
            rows,
            cols,
            drag,
            light,
            output,
        } => {
            let config = AppConfig::load_or_default(cli.config.as_deref())?;
            run_snapshot(&config, rows, cols, &drag, light, output.as_deref())?;
        }
        Commands::CheckConfig => {
            check_config(cli.config.as_deref());
        }
    }

    Ok(())
}

fn init_logging(level: Option<LogLevel>, log_file: Option<&Path>, interactive: bool) -> anyhow::Result<()> {
    let level_filter = if let Some(level) = level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    let builder = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter));

    // The viewer owns the screen, so stderr is off limits while it runs
    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None if interactive => builder.with_writer(std::io::sink).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Interactive loop: gather input until the frame deadline, then spin, light and draw
fn run_interactive(config: &AppConfig) -> anyhow::Result<()> {
    let mut renderer = Renderer::with_light(config.light.vector());
    let mut tracker = DragTracker::new();
    let frame_time = Duration::from_secs(1) / config.display.fps;
    let status = config.display.status_line.then_some(STATUS_LINE);

    let shutdown = Arc::new(AtomicBool::new(false));
    register_shutdown_signals(&shutdown).context("Failed to register signal handlers")?;
    install_panic_hook();

    let mut terminal = TerminalDisplay::new(config.display.status_line).context("Failed to initialize terminal")?;
    tracing::info!(fps = config.display.fps, "Starting interactive viewer");

    let mut next_frame = Instant::now();
    let mut events = Vec::new();

    loop {
        next_frame += frame_time;

        while !shutdown.load(Ordering::Relaxed) {
            let timeout = next_frame.saturating_duration_since(Instant::now());
            match terminal.poll_event(timeout) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Input error");
                    break;
                }
            }
            if timeout.is_zero() {
                break;
            }
        }

        // Don't try to catch up on frames we were too slow for
        let now = Instant::now();
        if next_frame < now {
            next_frame = now;
        }

        if terminal.check_resize() {
            let (rows, cols) = terminal.get_size();
            tracing::info!(rows, cols, "Terminal resized");
        }

        let frame = match frame_step(&mut renderer, &mut tracker, events.drain(..), &shutdown, terminal.get_size()) {
            ControlFlow::Continue(frame) => frame,
            ControlFlow::Break(()) => break,
        };
        if let Err(e) = terminal.render(&frame.to_ascii(), status) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                break;
            }
            tracing::warn!(error = %e, "Render error");
        }
    }

    drop(terminal);
    tracing::info!("Viewer stopped");
    Ok(())
}

/// Apply one frame's events and render it, or break when the viewer should stop
fn frame_step(
    renderer: &mut Renderer,
    tracker: &mut DragTracker,
    events: impl IntoIterator<Item = Event>,
    shutdown: &AtomicBool,
    (rows, cols): (u16, u16),
) -> ControlFlow<(), Frame> {
    if shutdown.load(Ordering::Relaxed) {
        tracing::info!("Shutdown signal received");
        return ControlFlow::Break(());
    }

    for event in events {
        match event {
            Event::Mouse(mouse) => tracker.push(mouse),
            Event::Key(key) => match parse_key_event(key) {
                Action::Quit => return ControlFlow::Break(()),
                Action::Reset => {
                    renderer.reset();
                    tracing::info!("Orientation reset");
                }
                Action::None => {}
            },
            _ => {}
        }
    }

    let input = tracker.finish_frame();
    renderer.rotate(input.drag.0, input.drag.1);
    if let Some(target) = input.light_target {
        let (x, y, z) = light_from_target(target, rows, cols);
        renderer.set_light(Vector3::new(x, y, z));
    }

    ControlFlow::Continue(renderer.render(i32::from(rows), i32::from(cols)))
}

/// Headless render of one frame
fn run_snapshot(
    config: &AppConfig,
    rows: Option<i32>,
    cols: Option<i32>,
    drags: &[(f32, f32)],
    light: Option<Vector3<f32>>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let (rows, cols) = match (rows, cols) {
        (Some(rows), Some(cols)) => (rows, cols),
        (rows, cols) => {
            let (term_rows, term_cols) = match crossterm::terminal::size() {
                Ok((w, h)) => (i32::from(h), i32::from(w)),
                Err(e) => {
                    tracing::debug!(error = %e, "No terminal size, using fallback");
                    FALLBACK_SIZE
                }
            };
            (rows.unwrap_or(term_rows), cols.unwrap_or(term_cols))
        }
    };

    let mut renderer = Renderer::with_light(config.light.vector());
    if let Some(light) = light {
        if !renderer.set_light(light) {
            tracing::warn!(?light, "Light vector too short, keeping configured light");
        }
    }
    for &(dx, dy) in drags {
        renderer.rotate(dx, dy);
    }

    let frame = renderer.render(rows, cols);
    tracing::info!(rows, cols, drags = drags.len(), "Rendered snapshot");

    match output {
        Some(path) => {
            std::fs::write(path, frame.to_ascii()).with_context(|| format!("Failed to write {:?}", path))?;
        }
        None => print!("{}", frame),
    }
    Ok(())
}

/// Validate configuration file
fn check_config(config_path: Option<&Path>) {
    match AppConfig::load_or_default(config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid\n");
            println!("Display:");
            println!("  FPS: {}", config.display.fps);
            println!("  Status line: {}", config.display.status_line);
            println!("\nLight:");
            println!("  Direction: {:?}", config.light.direction);
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_components<const N: usize>(s: &str) -> Result<[f32; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got {:?}", N, s));
    }
    let mut values = [0.0; N];
    for (value, part) in values.iter_mut().zip(parts) {
        *value = part.parse().map_err(|e| format!("invalid number {:?}: {}", part, e))?;
    }
    Ok(values)
}

fn parse_drag(s: &str) -> Result<(f32, f32), String> {
    let [dx, dy] = parse_components::<2>(s)?;
    Ok((dx, dy))
}

fn parse_light(s: &str) -> Result<Vector3<f32>, String> {
    parse_components::<3>(s).map(Vector3::from)
}
