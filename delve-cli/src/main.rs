mod narrate;
mod policy;
mod reports;
mod simulate;
mod storage;
mod terminal;
mod util;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use delve_game::constants::DEFAULT_SAVE_FILE;
use delve_game::{GameEngine, PlayError, RunConfig, RunOutcome, RunReport, SeededDice};
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use policy::PlayPolicy;
use storage::JsonFileStorage;
use terminal::TerminalFrontend;
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "delve", version)]
#[command(about = "Turn-based dungeon crawler: four adventurers, five floors, one boss")]
struct Cli {
    /// Save file used for loading and for the victory checkpoint
    #[arg(long, default_value = DEFAULT_SAVE_FILE, global = true)]
    save: PathBuf,

    /// JSON run configuration overriding the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the run's dice (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose logging (debug level unless RUST_LOG says otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play interactively in the terminal (default)
    Play,
    /// Run seeded automated playthroughs and report outcomes
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// Runs per policy and seed
    #[arg(long, default_value_t = 10)]
    runs: u32,

    /// Base seeds (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Policies to simulate (comma-separated, all when omitted)
    #[arg(long, value_enum, value_delimiter = ',')]
    policy: Vec<PlayPolicy>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let cfg = load_config(cli.config.as_deref())?;

    match &cli.command {
        Some(Command::Simulate(args)) => run_simulation(args, &cfg),
        Some(Command::Play) | None => run_interactive(&cli, cfg),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::load_from_static());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    RunConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn announce_banner() {
    println!("{}", "⚔  Delve".bright_cyan().bold());
    println!("{}", "========".cyan());
}

fn run_interactive(cli: &Cli, cfg: RunConfig) -> Result<()> {
    announce_banner();
    let (storage, slot) = JsonFileStorage::for_file(&cli.save);
    let engine = GameEngine::new(storage, cfg);
    let seed = cli.seed.unwrap_or_else(rand::random);
    log::info!("run seed {seed}");
    let mut dice = SeededDice::from_user_seed(seed);
    let stdin = io::stdin();
    let mut term = TerminalFrontend::new(stdin.lock(), stdout());

    match run_session(&engine, &slot, &mut term, &mut dice)? {
        Some(report) => {
            log::info!(
                "run finished: {:?} on floor {} after {} dice draws",
                report.outcome,
                report.state.floor,
                dice.draws()
            );
            if report.outcome == RunOutcome::Victory {
                term.say(&format!("セーブ先: {}", engine.storage().path_for(&slot).display()))?;
            }
        }
        None => term.say("\nまたの挑戦を待っている。")?,
    }
    Ok(())
}

/// A closed input stream ends the session quietly with `None`.
fn run_session<R: BufRead, W: Write>(
    engine: &GameEngine<JsonFileStorage>,
    slot: &str,
    term: &mut TerminalFrontend<R, W>,
    dice: &mut SeededDice,
) -> Result<Option<RunReport>> {
    let Ok(resume) = term.ask_resume() else {
        return Ok(None);
    };
    let Ok(state) = engine.start_run(slot, resume, term) else {
        return Ok(None);
    };
    match engine.play(slot, state, term, dice) {
        Ok(report) => Ok(Some(report)),
        Err(PlayError::Closed(_)) => Ok(None),
        Err(PlayError::Storage(err)) => {
            Err(anyhow::Error::new(err).context("failed to save the finished run"))
        }
    }
}

fn run_simulation(args: &SimulateArgs, cfg: &RunConfig) -> Result<()> {
    let start_time = Instant::now();
    let seeds = split_csv(&args.seeds)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed {token:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let policies = if args.policy.is_empty() {
        PlayPolicy::ALL.to_vec()
    } else {
        args.policy.clone()
    };

    let records = simulate::simulate_batch(cfg, &policies, &seeds, args.runs)?;
    let summary = simulate::summarize(&records);

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, &summary, &records)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, &summary)?,
        _ => reports::generate_console_report(
            &mut output_target,
            &summary,
            start_time.elapsed(),
        )?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
