//! Gridfill - a spreadsheet with linear-pattern autofill, in the terminal

mod config;
mod logging;
mod tui;

use anyhow::{Context, Result, bail};
use gridfill_core::{
    CellRef, DisplayBuffer, FileStore, GridSurface, KeyValueStore, MemoryStore, Session,
    SessionConfig, Workbook,
};
use std::env;
use std::path::PathBuf;

use config::{Config, load_config};
use tui::{App, AppSession};

fn print_usage() {
    eprintln!("Usage: gridfill [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --storage-dir <DIR>       Directory holding the stored grid");
    eprintln!("  --key <KEY>               Storage key (default: spreadsheetData)");
    eprintln!("  --config <FILE>           Load configuration from FILE");
    eprintln!("  --no-persist              Keep the grid in memory only");
    eprintln!("  --print                   Print the stored grid's cells and exit");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula against the stored grid and exit");
    eprintln!("  -h, --help                Print help");
}

#[derive(Default)]
struct Options {
    storage_dir: Option<PathBuf>,
    key: Option<String>,
    config: Option<PathBuf>,
    no_persist: bool,
    print: bool,
    command: Option<String>,
}

impl Options {
    fn interactive(&self) -> bool {
        !self.print && self.command.is_none()
    }
}

fn require_value(args: &[String], i: usize, what: &str) -> String {
    match args.get(i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires {}", args[i - 1], what);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--storage-dir" => {
                i += 1;
                options.storage_dir = Some(PathBuf::from(require_value(&args, i, "a directory")));
            }
            "--key" => {
                i += 1;
                options.key = Some(require_value(&args, i, "a value"));
            }
            "--config" => {
                i += 1;
                options.config = Some(PathBuf::from(require_value(&args, i, "a file path")));
            }
            "--no-persist" => options.no_persist = true,
            "--print" => options.print = true,
            "-c" | "--command" => {
                i += 1;
                options.command = Some(require_value(&args, i, "a formula"));
            }
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if let Err(e) = run(options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<()> {
    let (mut config, warnings) = load_config(options.config.as_deref());
    if let Some(dir) = options.storage_dir.clone() {
        config.storage_dir = Some(dir);
    }
    if let Some(key) = options.key.clone() {
        config.storage_key = key;
    }

    if options.interactive() {
        for warning in &warnings {
            eprintln!("Warning: {}", warning);
        }
        match config.data_dir() {
            Some(dir) => logging::init_file(&dir, config.log_level)?,
            None => eprintln!("Warning: no data directory, logging disabled"),
        }
    } else {
        logging::init_stderr(config.log_level)?;
        for warning in &warnings {
            log::warn!("{}", warning);
        }
    }

    let session = open_session(&config, options.no_persist)?;

    if options.print {
        print_cells(&session);
        return Ok(());
    }
    if let Some(formula) = options.command.as_deref() {
        let value = session
            .evaluate(formula)
            .with_context(|| format!("cannot evaluate {:?}", formula))?;
        println!("{}", value);
        return Ok(());
    }

    let mut app = App::new(session, config.col_width);
    tui::run(&mut app).context("terminal error")?;
    log::info!("session closed");
    Ok(())
}

fn open_session(config: &Config, no_persist: bool) -> Result<AppSession> {
    let store: Box<dyn KeyValueStore> = if no_persist {
        Box::new(MemoryStore::new().with_quota(config.storage_quota))
    } else {
        let Some(dir) = config.data_dir() else {
            bail!("could not determine a data directory; pass --storage-dir");
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        log::info!("storing grid in {}", dir.display());
        Box::new(FileStore::new(dir).with_quota(config.storage_quota))
    };

    let session_config = SessionConfig {
        storage_key: config.storage_key.clone(),
        min_rows: config.min_rows,
        min_cols: config.min_cols,
        ..SessionConfig::default()
    };
    Ok(Session::open(
        session_config,
        DisplayBuffer::new(),
        store,
        Workbook::new(),
    )?)
}

/// One line per non-blank cell: `A1<TAB>display<TAB>formula`.
fn print_cells<S: GridSurface, K: KeyValueStore>(session: &Session<S, K>) {
    for (row, col, cell) in session.grid().iter() {
        if cell.is_blank() {
            continue;
        }
        println!(
            "{}\t{}\t{}",
            CellRef::new(row, col),
            cell.value,
            cell.formula.as_deref().unwrap_or("")
        );
    }
}
