// Integration tests: load the fixture export and feed it to the engine.

use std::path::PathBuf;

use dynasty_core::{DraftOddsConfig, DraftOrderAssigner, SeasonSimulator, SimulationConfig};
use dynasty_sleeper::{LeagueData, LeagueExport, SleeperError};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/export")
}

fn league() -> LeagueData {
    LeagueData::load(&fixture_dir()).expect("fixture export loads")
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn export_loads_all_payloads() {
    let export = LeagueExport::load(&fixture_dir()).unwrap();
    assert_eq!(export.league.name, "Dynasty Degenerates");
    assert_eq!(export.rosters.len(), 6);
    assert_eq!(export.users.len(), 5);
    let weeks: Vec<u32> = export.weeks.iter().map(|w| w.week).collect();
    assert_eq!(weeks, vec![1, 2, 3, 4]);
}

#[test]
fn missing_export_reports_path() {
    let err = LeagueData::load(&fixture_dir().join("does-not-exist")).unwrap_err();
    match err {
        SleeperError::Io { path, .. } => assert!(path.ends_with("league.json")),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn schedule_metadata() {
    let data = league();
    assert_eq!(data.league_id(), "1048213337440243712");
    assert_eq!(data.season(), "2024");
    assert_eq!(data.remaining_weeks(), 8);
    assert_eq!(data.playoff_teams(), 4);
    assert_eq!(data.non_playoff_slots(), 2);
    assert_eq!(data.division_config().map(|d| d.count), Some(2));
}

// ===========================================================================
// Standings
// ===========================================================================

#[test]
fn snapshot_matches_scored_weeks_only() {
    let snap = league().snapshot();
    assert_eq!(snap.len(), 6);

    let record = |id| {
        let t = snap.team(id).unwrap();
        (t.wins, t.losses, t.ties)
    };
    assert_eq!(record(1), (2, 1, 0));
    assert_eq!(record(2), (1, 1, 1));
    assert_eq!(record(4), (3, 0, 0));
    assert_eq!(record(5), (0, 3, 0));
    assert_eq!(record(6), (1, 1, 1));

    let pf = snap.team(4).unwrap().points_for;
    assert!((pf - 394.2).abs() < 1e-6);
    assert_eq!(snap.team(4).unwrap().division, Some(2));
    assert_eq!(snap.h2h().wins(4, 1), 1);
    assert_eq!(snap.h2h().wins(2, 6), 0);
}

#[test]
fn matchup_records_agree_with_platform_records() {
    let data = league();
    let snap = data.snapshot();
    for line in data.reported_standings() {
        let team = snap.team(line.roster_id).unwrap();
        assert_eq!((team.wins, team.losses, team.ties), (line.wins, line.losses, line.ties));
        assert!((team.points_for - line.points_for).abs() < 1e-6);
    }
}

#[test]
fn reported_standings_order_and_names() {
    let data = league();
    let lines = data.reported_standings();
    let ids: Vec<u32> = lines.iter().map(|l| l.roster_id).collect();
    assert_eq!(ids, vec![4, 1, 3, 2, 6, 5]);

    assert_eq!(data.team_name(1), "Gridiron Gang");
    assert_eq!(data.team_name(2), "bob");
    assert_eq!(data.team_name(3), "Carol's Crew");
    assert_eq!(data.team_name(5), "erin");
    assert_eq!(data.team_name(6), "Team 6");
    assert_eq!(lines[5].owner_name, "erin");
}

// ===========================================================================
// Engine round trip
// ===========================================================================

#[test]
fn fixture_league_runs_through_engine() {
    let data = league();
    let snap = data.snapshot();
    let sim = SeasonSimulator::new(SimulationConfig {
        trials: 2_000,
        seed: Some(3),
        ..SimulationConfig::default()
    })
    .unwrap();
    let predictions = sim
        .simulate_season(
            &snap,
            data.remaining_weeks(),
            data.playoff_teams(),
            data.division_config().as_ref(),
        )
        .unwrap();
    assert_eq!(predictions.len(), 6);
    assert!(predictions.iter().all(|p| p.division_winner_pct.is_some()));

    let odds = DraftOrderAssigner::new(DraftOddsConfig {
        trials: 2_000,
        seed: Some(3),
        ..DraftOddsConfig::default()
    })
    .unwrap()
    .assign_draft_order(
        &snap,
        &predictions,
        data.team_count(),
        data.non_playoff_slots(),
        data.remaining_weeks(),
    )
    .unwrap();
    assert_eq!(odds.len(), 6);
    for team in &odds {
        assert_eq!(team.slots.len(), 6);
        assert!((team.total_pct() - 100.0).abs() <= 0.5);
    }
}
