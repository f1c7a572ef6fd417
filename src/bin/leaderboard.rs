use std::path::PathBuf;

use anyhow::{Context, Result};

use brownlow_votes::config::flag_value;
use brownlow_votes::leaderboard::leaderboard_from_store;
use brownlow_votes::store::{SqliteVoteStore, default_db_path};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let db_path = flag_value(&args, "--db")
        .or_else(|| std::env::var("BROWNLOW_DB").ok())
        .map(PathBuf::from)
        .or_else(default_db_path)
        .context("unable to resolve sqlite path")?;
    let model = flag_value(&args, "--model");
    let json = args.iter().any(|a| a == "--json");

    let store = SqliteVoteStore::open(&db_path)?;
    let board = leaderboard_from_store(&store, model.as_deref())?;

    if json {
        let rows: Vec<(&str, u32)> = board.iter().map(|e| (e.player.as_str(), e.votes)).collect();
        let body = serde_json::json!({ "Leaderboard": rows });
        println!("{body}");
        return Ok(());
    }

    println!("Brownlow leaderboard ({})", db_path.display());
    for (rank, entry) in board.iter().enumerate() {
        println!("{:>3}. {:<32} {:>3}", rank + 1, entry.player, entry.votes);
    }
    if board.is_empty() {
        println!("(no votes stored)");
    }
    Ok(())
}
