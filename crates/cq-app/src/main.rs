//! Main application entry point

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use cq_core::{ConsoleConfig, ConsoleError, Session, UploadedFile};
use cq_views::{format_bytes, render_table, ResultShaper};

const HELP: &str = "\
Commands:
  .load <file.csv>   load a CSV file as table `tablename`
  .info              show the loaded dataset
  .json              toggle JSON output
  .help              show this help
  .quit              exit
Anything else is run as a SQL query.";

/// Interactive SQL console over a single CSV file
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "csvquery", version, about)]
struct Args {
    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra cell text to load as NULL (repeatable)
    #[arg(long = "null", value_name = "TEXT")]
    null_patterns: Vec<String>,

    /// CSV file to load on startup
    #[arg(value_name = "CSV")]
    file: Option<PathBuf>,
}

impl Args {
    fn console_config(&self) -> Result<ConsoleConfig> {
        let mut config = match &self.config {
            Some(path) => ConsoleConfig::load(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => ConsoleConfig::default(),
        };
        for pattern in &self.null_patterns {
            config.csv.null_config.add_pattern(pattern.clone());
        }
        Ok(config)
    }
}

/// One line of user input
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Load(&'a str),
    Info,
    ToggleJson,
    Help,
    Quit,
    Query(&'a str),
    Empty,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some((".load", path)) => Command::Load(path.trim()),
            _ => match line {
                "" => Command::Empty,
                ".info" => Command::Info,
                ".json" => Command::ToggleJson,
                ".help" => Command::Help,
                ".quit" | ".exit" => Command::Quit,
                query => Command::Query(query),
            },
        }
    }
}

/// Terminal front-end over a console session
struct ConsoleApp {
    session: Session,
    shaper: ResultShaper,
    runtime: tokio::runtime::Runtime,
    json_output: bool,
}

impl ConsoleApp {
    fn new(config: ConsoleConfig) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let shaper = ResultShaper::new(config.page_size);
        let session = cq_data::open_session(config)?;

        Ok(Self {
            session,
            shaper,
            runtime,
            json_output: false,
        })
    }

    /// Returns false once the user asked to quit
    fn handle(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        match Command::parse(line) {
            Command::Empty => {}
            Command::Quit => return Ok(false),
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::ToggleJson => {
                self.json_output = !self.json_output;
                writeln!(out, "JSON output {}", if self.json_output { "on" } else { "off" })?;
            }
            Command::Info => match self.session.dataset() {
                Some(dataset) => writeln!(
                    out,
                    "{} <- {} ({}), {} rows, {} columns",
                    dataset.name,
                    dataset.source_name,
                    format_bytes(dataset.size_bytes),
                    dataset.row_count.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string()),
                    dataset.column_count().map(|n| n.to_string()).unwrap_or_else(|| "?".to_string()),
                )?,
                None => writeln!(out, "No dataset loaded")?,
            },
            Command::Load(path) => self.load(path, out)?,
            Command::Query(sql) => self.query(sql, out)?,
        }
        Ok(true)
    }

    fn load(&mut self, path: &str, out: &mut impl Write) -> io::Result<()> {
        let file = match UploadedFile::from_path(path) {
            Ok(file) => file,
            Err(e) => return writeln!(out, "File load failed: {}", e),
        };

        writeln!(out, "Loading {}...", file.name)?;
        match self.runtime.block_on(self.session.load_csv(file)) {
            Ok(dataset) => writeln!(
                out,
                "Loaded {} ({}) - ready to query",
                dataset.source_name,
                format_bytes(dataset.size_bytes)
            ),
            Err(e) => self.report(out, "File load failed", &e),
        }
    }

    fn query(&mut self, sql: &str, out: &mut impl Write) -> io::Result<()> {
        match self.runtime.block_on(self.session.run_query(sql)) {
            Ok(outcome) => {
                let display = self.shaper.shape(&outcome.rows.rows, outcome.elapsed_ms());
                if self.json_output {
                    let json = display.to_json().map_err(io::Error::from)?;
                    writeln!(out, "{}", json)
                } else {
                    write!(out, "{}", render_table(&display))?;
                    writeln!(out, "{}", display.summary)
                }
            }
            Err(e) => self.report(out, "Query failed", &e),
        }
    }

    fn report(&self, out: &mut impl Write, action: &str, err: &ConsoleError) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string(&err.descriptor()).map_err(io::Error::from)?;
            writeln!(out, "{}", json)
        } else if err.is_admission() {
            writeln!(out, "{}", err)
        } else {
            writeln!(out, "{}: {}", action, err)
        }
    }

    fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        write!(out, "> ")?;
        out.flush()?;
        for line in input.lines() {
            if !self.handle(&line?, out)? {
                break;
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();
    let config = args.console_config()?;

    info!("Starting CSV query console");

    let mut app = ConsoleApp::new(config).map_err(|e| {
        error!("{}", e);
        e
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Ready - upload a CSV file to begin (.help for commands)")?;

    if let Some(path) = &args.file {
        app.load(&path.to_string_lossy(), &mut out)?;
    }

    app.run(io::stdin().lock(), &mut out)?;
    Ok(())
}
