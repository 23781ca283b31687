mod app;
mod config;
mod selection;
mod theme;
mod tiles;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup, Section};
use config::AppConfig;
use tiles::TileGrid;

#[derive(Parser, Debug)]
#[command(name = "tilepick")]
#[command(version = "0.1.0")]
#[command(about = "A terminal picker for rendered map tile sets")]
struct Args {
    /// Map directory containing tile.<x>.<z>.png images
    /// (default: configured map dir, else the current directory)
    dir: Option<PathBuf>,

    /// Print discovered tile names and exit
    #[arg(short, long)]
    list: bool,

    /// With --list, print tiles and bounds as JSON
    #[arg(short, long)]
    json: bool,

    /// Pre-select a tile by name (repeatable)
    #[arg(short, long = "select", value_name = "NAME")]
    select: Vec<String>,

    /// Do not print the selection on exit
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();

    let map_dir = args
        .dir
        .clone()
        .or_else(|| config.default_map_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    // Handle CLI-only commands
    if args.list || args.json {
        return list_tiles(&map_dir, args.json);
    }

    let mut app = App::new(&map_dir, config)?;
    if !args.select.is_empty() {
        app.select_names(&args.select);
    }

    run_tui(&mut app)?;

    // The selection is the tool's product: one tile name per line
    if !args.quiet {
        for name in app.selected_names() {
            println!("{}", name);
        }
    }
    Ok(())
}

fn list_tiles(dir: &Path, json: bool) -> Result<()> {
    let grid = TileGrid::scan(dir)?;

    if json {
        let output = serde_json::json!({
            "dir": dir,
            "bounds": grid.bounds(),
            "tiles": grid.tiles(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        for tile in grid.tiles() {
            println!("{}", tile.name);
        }
    }
    Ok(())
}

fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        // 'q' must stay typeable inside the mirror panel
                        KeyCode::Char('q')
                            if app.popup == Popup::None && app.section == Section::Grid =>
                        {
                            return Ok(())
                        }
                        KeyCode::Char('c')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                app.status_message = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        app.tick();
    }
}
