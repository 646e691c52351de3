use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};

use matchday_terminal::api::{LeagueApi, parse_list_json, parse_record_json};
use matchday_terminal::model::{
    Match, NewMatch, NewPlayer, NewTeam, Player, ScoreUpdate, Standing, Team,
};
use matchday_terminal::provider::{handle_command, spawn_provider};
use matchday_terminal::state::{Delta, PageToken, ProviderCommand};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Serves the JSON fixtures and records every call. Operations named in
/// `failing` answer with an error instead.
#[derive(Default)]
struct FakeLeague {
    calls: Mutex<Vec<String>>,
    failing: HashSet<&'static str>,
}

impl FakeLeague {
    fn failing(ops: &[&'static str]) -> Self {
        Self {
            failing: ops.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn record(&self, call: String, op: &'static str) -> Result<()> {
        self.calls.lock().expect("calls lock").push(call);
        if self.failing.contains(op) {
            return Err(anyhow!("{op}: http 500"));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl LeagueApi for FakeLeague {
    fn standings(&self) -> Result<Vec<Standing>> {
        self.record("GET /standings".to_string(), "standings")?;
        parse_list_json(&read_fixture("standings.json"))
    }

    fn matches(&self) -> Result<Vec<Match>> {
        self.record("GET /matches".to_string(), "matches")?;
        parse_list_json(&read_fixture("matches.json"))
    }

    fn create_match(&self, payload: &NewMatch) -> Result<Match> {
        self.record("POST /matches".to_string(), "create_match")?;
        Ok(Match {
            id: 500,
            date: payload.date.clone(),
            home_team_id: payload.home_team_id,
            away_team_id: payload.away_team_id,
            home_score: None,
            away_score: None,
            is_finished: false,
            home_team: None,
            away_team: None,
        })
    }

    fn update_score(&self, match_id: u32, payload: &ScoreUpdate) -> Result<Match> {
        self.record(format!("PATCH /matches/{match_id}"), "update_score")?;
        let mut row = parse_list_json::<Match>(&read_fixture("matches.json"))?
            .into_iter()
            .find(|m| m.id == match_id)
            .ok_or_else(|| anyhow!("no match {match_id}"))?;
        row.home_score = Some(payload.home_score);
        row.away_score = Some(payload.away_score);
        row.is_finished = payload.is_finished;
        Ok(row)
    }

    fn teams(&self) -> Result<Vec<Team>> {
        self.record("GET /teams".to_string(), "teams")?;
        parse_list_json(&read_fixture("teams.json"))
    }

    fn team(&self, team_id: u32) -> Result<Option<Team>> {
        self.record(format!("GET /teams/{team_id}"), "team")?;
        let team: Team = parse_record_json(&read_fixture("team_detail.json"))?;
        Ok((team.id == team_id).then_some(team))
    }

    fn create_team(&self, payload: &NewTeam) -> Result<Team> {
        self.record("POST /teams".to_string(), "create_team")?;
        Ok(Team {
            id: 77,
            name: payload.name.clone(),
            logo: payload.logo.clone(),
            coach: payload.coach.clone(),
            stadium: payload.stadium.clone(),
            founded: payload.founded,
            players: None,
        })
    }

    fn delete_team(&self, team_id: u32) -> Result<()> {
        self.record(format!("DELETE /teams/{team_id}"), "delete_team")
    }

    fn create_player(&self, payload: &NewPlayer) -> Result<Player> {
        self.record("POST /players".to_string(), "create_player")?;
        Ok(Player {
            id: 88,
            name: payload.name.clone(),
            position: payload.position,
            number: payload.number,
            photo: Some(payload.photo.clone()),
            team_id: payload.team_id,
        })
    }

    fn delete_player(&self, player_id: u32) -> Result<()> {
        self.record(format!("DELETE /players/{player_id}"), "delete_player")
    }
}

const PAGE: PageToken = PageToken(4);

/// Runs one command to completion and returns every non-log delta plus the
/// log lines.
fn run(api: &FakeLeague, cmd: ProviderCommand) -> (Vec<Delta>, Vec<String>) {
    let (tx, rx) = mpsc::channel();
    handle_command(api, cmd, &tx, Duration::ZERO);
    drop(tx);
    let mut deltas = Vec::new();
    let mut logs = Vec::new();
    for delta in rx {
        match delta {
            Delta::Log(line) => logs.push(line),
            other => deltas.push(other),
        }
    }
    (deltas, logs)
}

fn new_match() -> NewMatch {
    NewMatch {
        home_team_id: 10,
        away_team_id: 11,
        date: "2025-09-13T11:30:00.000Z".to_string(),
    }
}

fn new_player() -> NewPlayer {
    NewPlayer {
        name: "Ethan Nwaneri".to_string(),
        number: 53,
        position: matchday_terminal::model::Position::Midfielder,
        team_id: 10,
        photo: String::new(),
    }
}

#[test]
fn home_load_fetches_standings_and_matches() {
    let api = FakeLeague::default();
    let (deltas, logs) = run(&api, ProviderCommand::LoadHome { page: PAGE });
    assert_eq!(deltas.len(), 1);
    let Delta::HomeLoaded {
        page,
        standings,
        matches,
    } = &deltas[0]
    else {
        panic!("expected home data, got {:?}", deltas[0]);
    };
    assert_eq!(*page, PAGE);
    assert_eq!(standings.len(), 8);
    assert_eq!(matches.len(), 6);
    let mut calls = api.calls();
    calls.sort();
    assert_eq!(calls, vec!["GET /matches", "GET /standings"]);
    assert!(logs.iter().all(|l| l.starts_with("[INFO]")));
}

#[test]
fn home_load_is_all_or_nothing() {
    let api = FakeLeague::failing(&["standings"]);
    let (deltas, logs) = run(&api, ProviderCommand::LoadHome { page: PAGE });
    let Delta::HomeLoaded {
        standings, matches, ..
    } = &deltas[0]
    else {
        panic!("expected home data");
    };
    assert!(standings.is_empty());
    assert!(matches.is_empty());
    assert!(logs.iter().any(|l| l.starts_with("[WARN] Home fetch error")));
}

#[test]
fn club_list_failure_settles_empty() {
    let api = FakeLeague::failing(&["teams"]);
    let (deltas, logs) = run(&api, ProviderCommand::LoadClubs { page: PAGE });
    assert!(matches!(&deltas[..], [Delta::ClubsLoaded { teams, .. }] if teams.is_empty()));
    assert!(logs.iter().any(|l| l.contains("Club list fetch error")));
}

#[test]
fn fixtures_load_brings_teams_along() {
    let api = FakeLeague::default();
    let (deltas, _) = run(&api, ProviderCommand::LoadFixtures { page: PAGE });
    assert!(matches!(
        &deltas[..],
        [Delta::FixturesLoaded { matches, teams, .. }] if matches.len() == 6 && teams.len() == 4
    ));
}

#[test]
fn club_load_reports_missing_and_failing_clubs_as_none() {
    let api = FakeLeague::default();
    let (deltas, _) = run(&api, ProviderCommand::LoadClub { page: PAGE, team_id: 10 });
    assert!(matches!(&deltas[..], [Delta::ClubLoaded { team: Some(t), .. }] if t.id == 10));

    let (deltas, _) = run(&api, ProviderCommand::LoadClub { page: PAGE, team_id: 99 });
    assert!(matches!(&deltas[..], [Delta::ClubLoaded { team: None, .. }]));

    let api = FakeLeague::failing(&["team"]);
    let (deltas, logs) = run(&api, ProviderCommand::LoadClub { page: PAGE, team_id: 10 });
    assert!(matches!(&deltas[..], [Delta::ClubLoaded { team: None, .. }]));
    assert!(logs.iter().any(|l| l.contains("Club fetch error")));
}

#[test]
fn club_mutations_do_not_refetch() {
    let api = FakeLeague::default();
    let payload = NewTeam {
        name: "Leeds United".to_string(),
        logo: None,
        coach: "Daniel Farke".to_string(),
        stadium: None,
        founded: None,
    };
    let (deltas, _) = run(&api, ProviderCommand::CreateClub { page: PAGE, payload });
    assert!(matches!(&deltas[..], [Delta::ClubCreated { result: Ok(t), .. }] if t.id == 77));

    let (deltas, _) = run(&api, ProviderCommand::DeleteClub { page: PAGE, team_id: 12 });
    assert!(matches!(
        &deltas[..],
        [Delta::ClubDeleted { team_id: 12, result: Ok(()), .. }]
    ));
    assert_eq!(api.calls(), vec!["POST /teams", "DELETE /teams/12"]);
}

#[test]
fn failed_mutation_carries_the_error_text() {
    let api = FakeLeague::failing(&["delete_team"]);
    let (deltas, _) = run(&api, ProviderCommand::DeleteClub { page: PAGE, team_id: 12 });
    let [Delta::ClubDeleted { result: Err(err), .. }] = &deltas[..] else {
        panic!("expected a failed deletion");
    };
    assert!(err.contains("http 500"));
}

#[test]
fn scheduling_refetches_fixtures_after_success() {
    let api = FakeLeague::default();
    let (deltas, _) = run(
        &api,
        ProviderCommand::ScheduleFixture {
            page: PAGE,
            payload: new_match(),
        },
    );
    assert_eq!(deltas.len(), 2);
    assert!(matches!(&deltas[0], Delta::FixtureScheduled { result: Ok(m), .. } if m.id == 500));
    assert!(matches!(&deltas[1], Delta::FixturesLoaded { page, .. } if *page == PAGE));
    let calls = api.calls();
    assert_eq!(calls[0], "POST /matches");
    assert_eq!(calls.len(), 3);
}

#[test]
fn failed_scheduling_skips_the_refetch() {
    let api = FakeLeague::failing(&["create_match"]);
    let (deltas, _) = run(
        &api,
        ProviderCommand::ScheduleFixture {
            page: PAGE,
            payload: new_match(),
        },
    );
    assert!(matches!(
        &deltas[..],
        [Delta::FixtureScheduled { result: Err(_), .. }]
    ));
    assert_eq!(api.calls(), vec!["POST /matches"]);
}

#[test]
fn score_update_refetches_fixtures() {
    let api = FakeLeague::default();
    let (deltas, _) = run(
        &api,
        ProviderCommand::RecordScore {
            page: PAGE,
            match_id: 101,
            payload: ScoreUpdate::final_score(1, 1),
        },
    );
    assert_eq!(deltas.len(), 2);
    assert!(matches!(
        &deltas[0],
        Delta::ScoreRecorded { match_id: 101, result: Ok(m), .. } if m.is_finished && m.home_score == Some(1)
    ));
    assert!(matches!(&deltas[1], Delta::FixturesLoaded { .. }));
    assert_eq!(api.calls()[0], "PATCH /matches/101");
}

#[test]
fn squad_changes_refetch_the_club() {
    let api = FakeLeague::default();
    let (deltas, _) = run(
        &api,
        ProviderCommand::AddPlayer {
            page: PAGE,
            team_id: 10,
            payload: new_player(),
        },
    );
    assert!(matches!(&deltas[0], Delta::PlayerAdded { result: Ok(p), .. } if p.id == 88));
    assert!(matches!(&deltas[1], Delta::ClubLoaded { team: Some(_), .. }));

    let (deltas, _) = run(
        &api,
        ProviderCommand::ReleasePlayer {
            page: PAGE,
            team_id: 10,
            player_id: 3,
        },
    );
    assert!(matches!(
        &deltas[0],
        Delta::PlayerReleased { player_id: 3, result: Ok(()), .. }
    ));
    assert!(matches!(&deltas[1], Delta::ClubLoaded { .. }));
    assert_eq!(
        api.calls(),
        vec![
            "POST /players",
            "GET /teams/10",
            "DELETE /players/3",
            "GET /teams/10"
        ]
    );
}

#[test]
fn failed_player_add_skips_the_refetch() {
    let api = FakeLeague::failing(&["create_player"]);
    let (deltas, _) = run(
        &api,
        ProviderCommand::AddPlayer {
            page: PAGE,
            team_id: 10,
            payload: new_player(),
        },
    );
    assert!(matches!(&deltas[..], [Delta::PlayerAdded { result: Err(_), .. }]));
}

#[test]
fn initial_loads_wait_for_the_settle_delay() {
    let api = FakeLeague::default();
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    handle_command(
        &api,
        ProviderCommand::LoadClubs { page: PAGE },
        &tx,
        Duration::from_millis(40),
    );
    assert!(started.elapsed() >= Duration::from_millis(40));
    drop(tx);
    assert!(rx.iter().any(|d| matches!(d, Delta::ClubsLoaded { .. })));
}

#[test]
fn spawned_provider_answers_over_the_channel() {
    let api: Arc<dyn LeagueApi> = Arc::new(FakeLeague::default());
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_provider(api, Duration::ZERO, tx, cmd_rx);

    cmd_tx
        .send(ProviderCommand::LoadClubs { page: PAGE })
        .expect("provider is listening");
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut loaded = None;
    while Instant::now() < deadline {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(Delta::ClubsLoaded { page, teams }) => {
                loaded = Some((page, teams.len()));
                break;
            }
            Ok(_) => continue,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    assert_eq!(loaded, Some((PAGE, 4)));

    drop(cmd_tx);
    handle.join().expect("provider loop exits once commands stop");
}
