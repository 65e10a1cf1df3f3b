//! ReelSpin headless runner
//!
//! Usage:
//!   reelspin simulate --spins 100     - Play spins at a fixed frame delta
//!   reelspin check machine.yaml       - Validate a machine config
//!   reelspin config                   - Print the default config as JSON

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use rsp_slot::{
    GameSession, SessionConfig, SessionStats, SettledSpin, SlotConfig, SlotMachine, TimingConfig,
};

/// Frames allowed for a single spin before the run is aborted
const MAX_FRAMES_PER_SPIN: u64 = 100_000;

#[derive(Parser)]
#[command(name = "reelspin", about = "ReelSpin headless slot runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play spins headlessly and print results
    Simulate {
        /// Number of spins
        #[arg(short, long, default_value_t = 10)]
        spins: u32,
        /// RNG seed (OS entropy when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Machine config (.json, .yaml or .yml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Timing profile, overrides the config's timing block
        #[arg(short, long, value_enum)]
        profile: Option<Profile>,
        /// Frame delta per update (1.0 = one 60 Hz frame)
        #[arg(long, default_value_t = 1.0)]
        delta: f64,
        #[arg(long, default_value_t = 1000.0)]
        balance: f64,
        #[arg(long, default_value_t = 10.0)]
        bet: f64,
        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Validate a machine config
    Check {
        config: PathBuf,
    },
    /// Print the default machine config
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Normal,
    Turbo,
}

impl Profile {
    fn timing(self) -> TimingConfig {
        match self {
            Profile::Normal => TimingConfig::normal(),
            Profile::Turbo => TimingConfig::turbo(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            spins,
            seed,
            config,
            profile,
            delta,
            balance,
            bet,
            quiet,
        } => {
            let mut slot_config = load_config(config.as_deref())?;
            if let Some(profile) = profile {
                slot_config = slot_config.with_timing(profile.timing());
            }
            let session = SessionConfig {
                starting_balance: balance,
                starting_bet: bet,
                ..SessionConfig::default()
            };
            simulate(slot_config, session, seed, spins, delta, quiet)
        }
        Commands::Check { config } => check_config(&config),
        Commands::Config => {
            println!("{}", SlotConfig::default().to_json()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SlotConfig> {
    match path {
        Some(path) => SlotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(SlotConfig::default()),
    }
}

fn simulate(
    config: SlotConfig,
    session_config: SessionConfig,
    seed: Option<u64>,
    spins: u32,
    delta: f64,
    quiet: bool,
) -> Result<()> {
    if !(delta.is_finite() && delta > 0.0) {
        bail!("Frame delta must be positive, got {delta}");
    }

    let machine = match seed {
        Some(seed) => SlotMachine::from_seed(config, seed)?,
        None => SlotMachine::from_os_rng(config)?,
    };
    let mut session = GameSession::new(machine, session_config)?;

    println!(
        "🎰 Simulating {spins} spins (balance {:.2}, bet {:.2})\n",
        session.balance(),
        session.bet()
    );

    let mut played = 0;
    let mut frames = 0u64;
    while played < spins {
        if !session.can_spin() {
            println!("⚠️  Balance {:.2} below bet, stopping", session.balance());
            break;
        }
        session.spin()?;

        let settled = run_until_settled(&mut session, delta, &mut frames)?;
        played += 1;
        if !quiet {
            print_spin(&settled);
        }
    }

    print_stats(session.stats(), session.balance(), frames);
    Ok(())
}

fn run_until_settled(session: &mut GameSession, delta: f64, frames: &mut u64) -> Result<SettledSpin> {
    for _ in 0..MAX_FRAMES_PER_SPIN {
        *frames += 1;
        if let Some(settled) = session.update(delta) {
            return Ok(settled);
        }
    }
    bail!("Spin did not settle within {MAX_FRAMES_PER_SPIN} frames")
}

fn print_spin(settled: &SettledSpin) {
    let outcome = &settled.outcome;
    let rows = outcome.grid.first().map_or(0, Vec::len);

    println!("Spin #{}", outcome.spin_id);
    for row in 0..rows {
        let line: Vec<String> = outcome
            .grid
            .iter()
            .map(|reel| format!("{:>2}", reel[row]))
            .collect();
        println!("  [{}]", line.join(" "));
    }
    for win in &outcome.evaluation.line_wins {
        println!(
            "  line {:>2}: {} x symbol {} pays {}",
            win.line_index + 1,
            win.positions.len(),
            win.symbol_id,
            win.payout
        );
    }
    println!(
        "  win {:.2} → balance {:.2}\n",
        settled.credited, settled.balance
    );
}

fn print_stats(stats: &SessionStats, balance: f64, frames: u64) {
    println!("📊 Session");
    println!("  spins:       {}", stats.total_spins);
    println!("  wagered:     {:.2}", stats.total_bet);
    println!("  won:         {:.2}", stats.total_win);
    println!("  rtp:         {:.2}%", stats.rtp());
    println!("  hit rate:    {:.2}%", stats.hit_rate());
    println!("  biggest win: {:.2}", stats.biggest_win);
    println!("  balance:     {balance:.2}");
    println!("  frames:      {frames}");
}

fn check_config(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    println!(
        "✅ {}: {}×{} grid, {} symbols, {} paylines, {:?} timing (~{:.0} frames per spin)",
        path.display(),
        config.grid.reels,
        config.grid.visible_rows,
        config.catalog.len(),
        config.paylines.len(),
        config.timing.profile,
        config.timing.nominal_spin_duration(config.grid.reels)
    );
    Ok(())
}
