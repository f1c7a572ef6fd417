use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use brownlow_votes::inference::score_rows;
use brownlow_votes::model::{Activation, DenseLayer, VoteModel, VoteModelArtifact};
use brownlow_votes::stats::{AFL_STAT_NAMES, RawStatRow};
use brownlow_votes::teams::{TEAM_KEYS, team_code};
use brownlow_votes::transform::{FeatureTable, transform_gamebygame};
use brownlow_votes::votes::allocate_votes;

const PLAYERS_PER_TEAM: usize = 22;
const ROUNDS: u32 = 23;

/// A season's worth of long-format rows: 18 teams paired off each round.
fn sample_season() -> Vec<RawStatRow> {
    let teams: Vec<&str> = TEAM_KEYS.iter().map(|(slug, _)| *slug).take(18).collect();
    let mut out = Vec::new();
    for round in 1..=ROUNDS {
        for pair in teams.chunks(2) {
            let [home, away] = [pair[0], pair[1]];
            for (team, opp) in [(home, away), (away, home)] {
                let code = team_code(opp).unwrap_or("NA");
                for p in 0..PLAYERS_PER_TEAM {
                    for (s, stat) in AFL_STAT_NAMES.iter().enumerate() {
                        out.push(RawStatRow {
                            player: format!("{team}_{p}"),
                            team: team.to_string(),
                            round,
                            opponent: Some(code.to_string()),
                            stat: stat.to_string(),
                            value: ((p * 7 + s * 3 + round as usize) % 31).to_string(),
                        });
                    }
                }
            }
        }
    }
    out
}

fn sample_model() -> VoteModel {
    let width = AFL_STAT_NAMES.len();
    VoteModel::from_artifact(VoteModelArtifact {
        version: 1,
        feature_names: AFL_STAT_NAMES.iter().map(|s| s.to_string()).collect(),
        feature_means: Vec::new(),
        feature_stds: Vec::new(),
        layers: vec![
            DenseLayer {
                weights: (0..16)
                    .map(|h| (0..width).map(|i| ((h + i) % 5) as f32 * 0.01).collect())
                    .collect(),
                bias: vec![0.0; 16],
                activation: Activation::Relu,
            },
            DenseLayer {
                weights: vec![vec![0.1; 16]],
                bias: vec![0.0],
                activation: Activation::Linear,
            },
        ],
    })
    .expect("valid bench model")
}

fn bench_transform(c: &mut Criterion) {
    let raw = sample_season();
    c.bench_function("transform_season", |b| {
        b.iter(|| {
            let table = transform_gamebygame(black_box(raw.clone()), 2024).unwrap();
            black_box(table.len());
        })
    });
}

fn bench_score_and_allocate(c: &mut Criterion) {
    let table: FeatureTable = transform_gamebygame(sample_season(), 2024)
        .unwrap()
        .filter_round(1);
    let model = sample_model();
    c.bench_function("score_and_allocate_round", |b| {
        b.iter(|| {
            let scored = score_rows(black_box(&table), &model, "bench").unwrap();
            black_box(allocate_votes(&scored).len());
        })
    });
}

criterion_group!(benches, bench_transform, bench_score_and_allocate);
criterion_main!(benches);
