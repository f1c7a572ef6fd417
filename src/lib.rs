//! Incremental Brownlow vote inference over AFL game-by-game player statistics.
//!
//! One run takes a year of scraped long-format stats, finds the next round that
//! has not been scored yet, evaluates the vote model per player and stores a
//! 3-2-1 allocation per game.

pub mod config;
pub mod error;
pub mod feature_source;
pub mod http_client;
pub mod inference;
pub mod leaderboard;
pub mod model;
pub mod pipeline;
pub mod record;
pub mod rounds;
pub mod stats;
pub mod store;
pub mod teams;
pub mod transform;
pub mod votes;

pub use error::PipelineError;
