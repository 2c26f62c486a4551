//! Ladder CLI — administer the club billiards ladder
//!
//! Provides subcommands to register players, issue and progress
//! challenges, record match scores, and display standings. Authorization
//! is assumed to have happened before the command runs (this is the
//! club admin's tool); the engine still re-validates every business rule.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use club_ladder::model::ChallengeStatus;
use club_ladder::standings::Standings;
use club_ladder::{Challenge, LadderEngine, LadderStore, Player};

#[derive(Parser)]
#[command(name = "ladder")]
#[command(about = "Club ladder — challenges, scores, and standings")]
struct Cli {
    /// Path to the ladder database
    #[arg(long, env = "LADDER_DB", default_value = "ladder.db")]
    db: PathBuf,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new player at the bottom of the ladder
    AddPlayer {
        /// Display name
        name: String,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
    },
    /// Remove a player (external identity removal must confirm first)
    DeletePlayer {
        /// Player id
        player_id: String,
    },
    /// Override a player's rank (admin action; 1 = top)
    SetRank {
        /// Player id
        player_id: String,
        /// New rank (positive integer)
        rank: u32,
    },
    /// Create a challenge between two players
    Challenge {
        /// Challenger player id
        challenger_id: String,
        /// Challenged player id
        challenged_id: String,
    },
    /// Advance a challenge's status (PENDING -> ACCEPTED -> COMPLETED)
    Status {
        /// Challenge id
        challenge_id: String,
        /// Target status
        status: String,
    },
    /// Record the match score on an accepted challenge
    Score {
        /// Challenge id
        challenge_id: String,
        /// Challenger's score
        challenger_score: u32,
        /// Challenged player's score
        challenged_score: u32,
    },
    /// Set or clear the scheduled match time
    Schedule {
        /// Challenge id
        challenge_id: String,
        /// Match time (RFC 3339, e.g. 2026-09-01T19:00:00Z); omit to clear
        date: Option<String>,
    },
    /// List a player's pending challenges (either side)
    Challenges {
        /// Player id
        player_id: String,
    },
    /// Show the ladder standings
    Standings,
    /// Show or set the maximum allowed rank difference
    MaxGap {
        /// New window; omit to print the current value
        value: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = LadderStore::new(cli.db.clone())?;
    let engine = LadderEngine::new(store.clone());

    match cli.command {
        Commands::AddPlayer { name, email } => {
            let player = engine.add_player(&name, email.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&player)?);
            } else {
                println!(
                    "Added {} at rank {} (id {})",
                    player.name.bold(),
                    player.rank,
                    player.id
                );
            }
        }
        Commands::DeletePlayer { player_id } => {
            engine.delete_player(&player_id)?;
            println!("Player {} deleted", player_id);
        }
        Commands::SetRank { player_id, rank } => {
            let player = engine.set_rank(&player_id, rank)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&player)?);
            } else {
                println!("{} is now rank {}", player.name.bold(), player.rank);
            }
        }
        Commands::Challenge {
            challenger_id,
            challenged_id,
        } => {
            let challenge = engine.create_challenge(&challenger_id, &challenged_id)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&challenge)?);
            } else {
                println!(
                    "Challenge {} created ({})",
                    challenge.id,
                    paint_status(challenge.status)
                );
            }
        }
        Commands::Status {
            challenge_id,
            status,
        } => {
            let status: ChallengeStatus = status
                .to_uppercase()
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let challenge = engine.update_status(&challenge_id, status)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&challenge)?);
            } else {
                println!(
                    "Challenge {} is now {}",
                    challenge.id,
                    paint_status(challenge.status)
                );
            }
        }
        Commands::Score {
            challenge_id,
            challenger_score,
            challenged_score,
        } => {
            let challenge = engine.submit_score(&challenge_id, challenger_score, challenged_score)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&challenge)?);
            } else {
                println!(
                    "Recorded {} - {} on challenge {}",
                    challenger_score, challenged_score, challenge.id
                );
            }
        }
        Commands::Schedule { challenge_id, date } => {
            let date = date
                .map(|d| {
                    DateTime::parse_from_rfc3339(&d)
                        .map(|dt| dt.with_timezone(&Utc))
                        .with_context(|| format!("invalid RFC 3339 date: {}", d))
                })
                .transpose()?;
            let challenge = engine.update_match_date(&challenge_id, date)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&challenge)?);
            } else {
                match challenge.match_date {
                    Some(dt) => println!("Challenge {} scheduled for {}", challenge.id, dt),
                    None => println!("Challenge {} schedule cleared", challenge.id),
                }
            }
        }
        Commands::Challenges { player_id } => {
            let challenges = engine.challenges_for_player(&player_id)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&challenges)?);
            } else {
                print_challenges(&challenges);
            }
        }
        Commands::Standings => {
            let players = Standings::new(store).list_players()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&players)?);
            } else {
                print_standings(&players);
            }
        }
        Commands::MaxGap { value } => match value {
            Some(n) => {
                let n = engine.set_max_rank_difference(n)?;
                println!("Maximum rank difference set to {}", n);
            }
            None => {
                println!("Maximum rank difference: {}", engine.max_rank_difference()?);
            }
        },
    }

    Ok(())
}

fn paint_status(status: ChallengeStatus) -> colored::ColoredString {
    match status {
        ChallengeStatus::Pending => status.as_str().yellow(),
        ChallengeStatus::Accepted => status.as_str().cyan(),
        ChallengeStatus::Completed => status.as_str().green(),
    }
}

fn print_standings(players: &[Player]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Rank", "Name", "Email", "Active challenge"]);
    for player in players {
        table.add_row(vec![
            player.rank.to_string(),
            player.name.clone(),
            player.email.clone().unwrap_or_default(),
            player
                .active_challenge_id
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");
}

fn print_challenges(challenges: &[Challenge]) {
    if challenges.is_empty() {
        println!("No pending challenges");
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Challenge", "Challenger", "Challenged", "Status", "Match date"]);
    for c in challenges {
        table.add_row(vec![
            c.id.clone(),
            c.challenger_id.clone(),
            c.challenged_id.clone(),
            c.status.to_string(),
            c.match_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");
}
