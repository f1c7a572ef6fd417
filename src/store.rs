use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use log::debug;
use rusqlite::{Connection, Row, params};

use crate::config::app_cache_dir;
use crate::record::VoteRecord;
use crate::rounds::PriorResults;

/// Where vote records live. Each write is an independent upsert on
/// `(hash_key, model)`.
pub trait VoteStore: PriorResults {
    fn put_record(&mut self, record: &VoteRecord) -> Result<()>;

    /// Every stored record, all models.
    fn scan(&self) -> Result<Vec<VoteRecord>>;
}

pub struct SqliteVoteStore {
    conn: Connection,
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("brownlow_votes.sqlite"))
}

impl SqliteVoteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Lookup by the `(player, model)` index.
    pub fn records_for_player(&self, player: &str, model: &str) -> Result<Vec<VoteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM vote_predictions
                 WHERE player = ?1 AND model = ?2
                 ORDER BY year ASC, round ASC"
            ))
            .context("prepare player records query")?;
        let rows = stmt
            .query_map(params![player, model], decode_record)
            .context("query player records")?;
        collect_rows(rows)
    }

    pub fn count(&self) -> Result<usize> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM vote_predictions", [], |row| {
                row.get::<_, i64>(0)
            })
            .context("count vote records")?;
        Ok(usize::try_from(n).unwrap_or_default())
    }
}

const RECORD_COLUMNS: &str =
    "hash_key, model, year_round, year, round, player, team, opponent, game_id, votes";

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS vote_predictions (
            hash_key TEXT NOT NULL,
            model TEXT NOT NULL,
            year_round TEXT NOT NULL,
            year INTEGER NOT NULL,
            round INTEGER NOT NULL,
            player TEXT NOT NULL,
            team TEXT NOT NULL,
            opponent TEXT NULL,
            game_id TEXT NOT NULL,
            votes INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (hash_key, model)
        );
        CREATE INDEX IF NOT EXISTS idx_votes_player_model ON vote_predictions(player, model);
        CREATE INDEX IF NOT EXISTS idx_votes_year_round ON vote_predictions(year, year_round);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

impl PriorResults for SqliteVoteStore {
    fn year_rounds(&self, year: i32) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT year_round FROM vote_predictions WHERE year = ?1")
            .context("prepare year_round query")?;
        let rows = stmt
            .query_map(params![year], |row| row.get::<_, String>(0))
            .context("query year_round")?;
        let mut out = BTreeSet::new();
        for row in rows {
            out.insert(row.context("decode year_round")?);
        }
        Ok(out)
    }
}

impl VoteStore for SqliteVoteStore {
    fn put_record(&mut self, r: &VoteRecord) -> Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO vote_predictions (
                    hash_key, model, year_round, year, round,
                    player, team, opponent, game_id, votes, updated_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5,
                    ?6, ?7, ?8, ?9, ?10, ?11
                )
                ON CONFLICT(hash_key, model) DO UPDATE SET
                    year_round = excluded.year_round,
                    year = excluded.year,
                    round = excluded.round,
                    player = excluded.player,
                    team = excluded.team,
                    opponent = excluded.opponent,
                    game_id = excluded.game_id,
                    votes = excluded.votes,
                    updated_at = excluded.updated_at
                "#,
                params![
                    r.hash_key,
                    r.model,
                    r.year_round,
                    r.year,
                    r.round,
                    r.player,
                    r.team,
                    r.opponent,
                    r.game_id,
                    r.votes,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("upsert vote record {}", r.hash_key))?;
        debug!("upserted {:?}", r.to_item()?);
        Ok(())
    }

    fn scan(&self) -> Result<Vec<VoteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM vote_predictions
                 ORDER BY year ASC, round ASC, game_id ASC, votes DESC"
            ))
            .context("prepare scan query")?;
        let rows = stmt.query_map([], decode_record).context("scan vote records")?;
        collect_rows(rows)
    }
}

fn decode_record(row: &Row<'_>) -> rusqlite::Result<VoteRecord> {
    Ok(VoteRecord {
        hash_key: row.get(0)?,
        model: row.get(1)?,
        year_round: row.get(2)?,
        year: row.get(3)?,
        round: row.get(4)?,
        player: row.get(5)?,
        team: row.get(6)?,
        opponent: row.get(7)?,
        game_id: row.get(8)?,
        votes: row.get(9)?,
    })
}

fn collect_rows<I>(rows: I) -> Result<Vec<VoteRecord>>
where
    I: Iterator<Item = rusqlite::Result<VoteRecord>>,
{
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode vote record")?);
    }
    Ok(out)
}
