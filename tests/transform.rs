use brownlow_votes::PipelineError;
use brownlow_votes::stats::RawStatRow;
use brownlow_votes::transform::transform_gamebygame;

fn raw(player: &str, team: &str, opponent: Option<&str>, round: u32, stat: &str, value: &str) -> RawStatRow {
    RawStatRow {
        player: player.to_string(),
        team: team.to_string(),
        round,
        opponent: opponent.map(str::to_string),
        stat: stat.to_string(),
        value: value.to_string(),
    }
}

fn sample_rows() -> Vec<RawStatRow> {
    vec![
        raw("Walsh, Sam", "carlton", Some("ES"), 1, "kicks", "18"),
        raw("Walsh, Sam", "carlton", Some("ES"), 1, "disposals", "30"),
        raw("Walsh, Sam", "carlton", Some("ES"), 1, "goals", "NA"),
        raw("Walsh, Sam", "carlton", Some("ES"), 1, "subs", "NA"),
        raw("Merrett, Zach", "essendon", Some("CA"), 1, "kicks", "15"),
        raw("Merrett, Zach", "essendon", Some("CA"), 1, "disposals", "25"),
        raw("Merrett, Zach", "essendon", Some("CA"), 1, "subs", "Off"),
        raw("Parish, Darcy", "essendon", Some("CA"), 1, "subs", "On"),
        raw("Parish, Darcy", "essendon", Some("CA"), 1, "kicks", "6"),
        raw("Walsh, Sam", "carlton", Some("GW"), 2, "kicks", "21"),
    ]
}

#[test]
fn pivots_to_one_row_per_player_game() {
    let table = transform_gamebygame(sample_rows(), 2024).expect("sample should transform");

    assert_eq!(table.year, 2024);
    assert_eq!(table.columns, vec!["disposals", "goals", "kicks"]);
    assert_eq!(table.len(), 4);

    let walsh = table
        .rows
        .iter()
        .find(|r| r.player == "Walsh, Sam" && r.round == 1)
        .expect("walsh round 1");
    assert_eq!(walsh.values, vec![30.0, 0.0, 18.0]);
    assert_eq!(walsh.opponent.as_deref(), Some("essendon"));
    assert_eq!(walsh.game_id, "carlton_essendon_1");
    assert_eq!(walsh.year_round, "2024_1");

    // Merrett has no goals observation at all.
    let merrett = table
        .rows
        .iter()
        .find(|r| r.player == "Merrett, Zach")
        .expect("merrett");
    assert_eq!(table.value(merrett, "goals"), Some(0.0));
    assert_eq!(table.value(merrett, "kicks"), Some(15.0));
    assert_eq!(merrett.game_id, walsh.game_id);

    let round_two = table.filter_round(2);
    assert_eq!(round_two.len(), 1);
    assert_eq!(round_two.rows[0].game_id, "carlton_gws_2");
    assert_eq!(table.rounds().into_iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn duplicate_observation_is_a_schema_conflict() {
    let mut rows = sample_rows();
    rows.push(raw("Walsh, Sam", "carlton", Some("ES"), 1, "kicks", "19"));

    let err = transform_gamebygame(rows, 2024).unwrap_err();
    assert_eq!(
        err,
        PipelineError::SchemaConflict {
            player: "Walsh, Sam".to_string(),
            team: "carlton".to_string(),
            round: 1,
            opponent: "essendon".to_string(),
            stat: "kicks".to_string(),
        }
    );
}

#[test]
fn opponent_code_and_slug_share_one_row() {
    let rows = vec![
        raw("Walsh, Sam", "carlton", Some("ES"), 1, "kicks", "18"),
        raw("Walsh, Sam", "carlton", Some("essendon"), 1, "goals", "2"),
    ];
    let table = transform_gamebygame(rows, 2024).expect("should transform");
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows[0].game_id, "carlton_essendon_1");
    assert_eq!(table.value(&table.rows[0], "kicks"), Some(18.0));
    assert_eq!(table.value(&table.rows[0], "goals"), Some(2.0));

    let repeated = vec![
        raw("Walsh, Sam", "carlton", Some("ES"), 1, "kicks", "18"),
        raw("Walsh, Sam", "carlton", Some("Essendon"), 1, "kicks", "18"),
    ];
    assert!(matches!(
        transform_gamebygame(repeated, 2024),
        Err(PipelineError::SchemaConflict { ref stat, .. }) if stat == "kicks"
    ));
}

#[test]
fn non_numeric_value_fails_the_year() {
    let mut rows = sample_rows();
    rows.push(raw("Cripps, Patrick", "carlton", Some("ES"), 1, "tackles", "lots"));

    let err = transform_gamebygame(rows, 2024).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidStatValue { ref stat, .. } if stat == "tackles"));
}

#[test]
fn unknown_opponent_is_left_missing() {
    let rows = vec![
        raw("Heeney, Isaac", "swans", Some("ZZ"), 3, "kicks", "14"),
        raw("Green, Tom", "gws", None, 3, "kicks", "9"),
    ];
    let table = transform_gamebygame(rows, 2023).expect("should transform");
    let heeney = &table.rows[1];
    assert_eq!(heeney.player, "Heeney, Isaac");
    assert_eq!(heeney.opponent, None);
    assert_eq!(heeney.game_id, "swans_3");
    assert_eq!(table.rows[0].game_id, "gws_3");
}

#[test]
fn empty_input_gives_empty_table() {
    let table = transform_gamebygame(Vec::new(), 2024).expect("empty is fine");
    assert!(table.is_empty());
    assert!(table.columns.is_empty());
}
