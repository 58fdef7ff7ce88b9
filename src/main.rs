use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pickem_standings::config::AppConfig;
use pickem_standings::engine::StandingsReport;
use pickem_standings::feeds::router::{serve, AppState};
use pickem_standings::telemetry::{init_metrics, init_tracing, DEFAULT_FILTER};

#[derive(Parser, Debug)]
#[command(name = "pickem", version, about = "Golf pick'em standings from a roster sheet and a live leaderboard")]
struct Cli {
    /// TOML config file (defaults to ./pickem.toml when present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the standings API
    Serve {
        /// Overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Compute standings once and print them
    Standings {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(DEFAULT_FILTER);
    init_metrics()?;

    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;
    let state = Arc::new(AppState::from_config(&cfg)?);

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
            serve(state, &bind).await?;
        }
        Command::Standings { json } => {
            let report = state.standings().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report).context("encoding report")?);
            } else {
                print_table(&report);
            }
        }
    }
    Ok(())
}

fn print_table(report: &StandingsReport) {
    println!("\n=== {} ===", report.tournament.as_deref().unwrap_or("No live tournament"));
    match report.current_period {
        Some(p) => println!("Current period: {}", p),
        None => println!("Current period: none (recorded results only)"),
    }
    println!();
    println!("{:>4}  {:<24} {:<22} {:>6} {:>6} {:>5}", "RANK", "TEAM", "PICK", "POS", "TOTAL", "CHG");

    for s in &report.standings {
        let pick = s.current_pick.as_ref().map(|p| p.player_name_raw.as_str()).unwrap_or("-");
        let pos = match (&s.live_data, s.pending) {
            (Some(entry), _) => entry.position.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
            (None, true) => "?".into(),
            (None, false) => "".into(),
        };
        let team = match s.team.missed_cuts {
            0 => s.team.name.clone(),
            1 => format!("{} (MC)", s.team.name),
            n => format!("{} (MC x{})", s.team.name, n),
        };
        let change = match s.rank_change {
            0 => String::new(),
            c if c > 0 => format!("+{}", c),
            c => c.to_string(),
        };
        println!(
            "{:>4}  {:<24} {:<22} {:>6} {:>6} {:>5}",
            s.rank, team, pick, pos, s.total_points, change
        );
    }

    if !report.diagnostics.is_empty() {
        println!("\nNotes:");
        for d in &report.diagnostics {
            println!("  - {}", d);
        }
    }
}
