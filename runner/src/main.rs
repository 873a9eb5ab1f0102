//! `maze-runner`: solve a maze served by a remote cell-validity oracle.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use maze_runner::attempt::{AttemptError, AttemptOutcome, run_attempt};
use maze_runner::core::board::Board;
use maze_runner::core::render::render;
use maze_runner::core::solver::solve;
use maze_runner::exit_codes;
use maze_runner::io::config::{
    DEFAULT_CONFIG_PATH, MazeRunnerConfig, load_config, write_config,
};
use maze_runner::io::oracle::OracleClient;
use maze_runner::io::transport::HttpTransport;
use maze_runner::logging;

#[derive(Parser)]
#[command(
    name = "maze-runner",
    version,
    about = "Find a path through a maze known only to a remote oracle"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Fetch a maze from the oracle, solve it, and submit the path.
    Run {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Override `oracle.base_url`.
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Solve a board from a text file (`#` blocked, `.` open) without the oracle.
    Solve {
        board_file: PathBuf,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match dispatch(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn dispatch(command: Command) -> Result<i32> {
    match command {
        Command::Init { force, config } => cmd_init(&config, force),
        Command::Run { config, base_url } => cmd_run(&config, base_url),
        Command::Solve { board_file, config } => cmd_solve(&board_file, &config),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    write_config(path, &MazeRunnerConfig::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_run(config_path: &Path, base_url: Option<String>) -> Result<i32> {
    let mut cfg = load_config(config_path)?;
    if let Some(base_url) = base_url {
        cfg.oracle.base_url = base_url;
        cfg.validate().context("validate --base-url")?;
    }
    let transport = HttpTransport::new(&cfg.oracle.base_url, cfg.request_timeout())?;
    info!(base_url = transport.base_url(), "starting maze attempt");
    let client = OracleClient::from_config(transport, &cfg);

    match run_attempt(&client, cfg.solver.memo_policy) {
        Ok(AttemptOutcome::Submitted { path, response }) => {
            println!(
                "maze solved and submitted: {} ({} cells)",
                response.trim(),
                path.len()
            );
            Ok(exit_codes::OK)
        }
        Ok(AttemptOutcome::Rejected { path }) => {
            eprintln!(
                "maze solved but the oracle rejected the {}-cell path",
                path.len()
            );
            Ok(exit_codes::SUBMIT_FAILED)
        }
        Ok(AttemptOutcome::Unsolvable) => {
            eprintln!("maze has no path from start to goal");
            Ok(exit_codes::UNSOLVED)
        }
        Err(err @ AttemptError::Init(_)) => {
            eprintln!("{err}");
            Ok(exit_codes::INIT_FAILED)
        }
        Err(err @ AttemptError::Submit(_)) => {
            eprintln!("{err}");
            Ok(exit_codes::SUBMIT_FAILED)
        }
    }
}

fn cmd_solve(board_file: &Path, config_path: &Path) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let text = fs::read_to_string(board_file)
        .with_context(|| format!("read {}", board_file.display()))?;
    let maze_id = board_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "board".to_string());
    let board =
        Board::parse(&maze_id, &text).with_context(|| format!("parse {}", board_file.display()))?;

    let solution = solve(&board, cfg.solver.memo_policy);
    print!("{}", render(&board, &solution.path));
    if !solution.found {
        eprintln!("maze has no path from start to goal");
        return Ok(exit_codes::UNSOLVED);
    }
    println!(
        "{}",
        serde_json::to_string(&solution.path).context("serialize path")?
    );
    Ok(exit_codes::OK)
}
