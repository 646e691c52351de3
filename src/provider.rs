use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;

use crate::api::LeagueApi;
use crate::model::{Match, Standing, Team};
use crate::state::{Delta, PageToken, ProviderCommand};

/// Runs commands off the UI thread. Each command gets its own thread, so a
/// hung request only stalls the flow that issued it. The loop ends once the
/// UI drops its command sender.
pub fn spawn_provider(
    api: Arc<dyn LeagueApi>,
    settle_delay: Duration,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            let api = Arc::clone(&api);
            let tx = tx.clone();
            thread::spawn(move || handle_command(api.as_ref(), cmd, &tx, settle_delay));
        }
    })
}

/// Executes one command to completion and reports every result on `tx`.
/// Initial page loads wait `settle_delay` after their requests settle.
pub fn handle_command(
    api: &dyn LeagueApi,
    cmd: ProviderCommand,
    tx: &Sender<Delta>,
    settle_delay: Duration,
) {
    match cmd {
        ProviderCommand::LoadHome { page } => {
            let (standings, matches) = load_home(api, tx);
            settle(settle_delay);
            let _ = tx.send(Delta::HomeLoaded {
                page,
                standings,
                matches,
            });
        }
        ProviderCommand::LoadClubs { page } => {
            log(tx, "[INFO] GET /teams");
            let teams = api
                .teams()
                .unwrap_or_else(|err| warn_empty(tx, "Club list", err));
            settle(settle_delay);
            let _ = tx.send(Delta::ClubsLoaded { page, teams });
        }
        ProviderCommand::LoadFixtures { page } => {
            let (matches, teams) = fetch_fixtures(api, tx);
            settle(settle_delay);
            let _ = tx.send(Delta::FixturesLoaded {
                page,
                matches,
                teams,
            });
        }
        ProviderCommand::LoadClub { page, team_id } => {
            let team = fetch_club(api, team_id, tx);
            settle(settle_delay);
            let _ = tx.send(Delta::ClubLoaded { page, team });
        }
        ProviderCommand::CreateClub { page, payload } => {
            log(tx, format!("[INFO] POST /teams ({})", payload.name));
            let result = api.create_team(&payload).map_err(describe);
            let _ = tx.send(Delta::ClubCreated { page, result });
        }
        ProviderCommand::DeleteClub { page, team_id } => {
            log(tx, format!("[INFO] DELETE /teams/{team_id}"));
            let result = api.delete_team(team_id).map_err(describe);
            let _ = tx.send(Delta::ClubDeleted {
                page,
                team_id,
                result,
            });
        }
        ProviderCommand::ScheduleFixture { page, payload } => {
            log(
                tx,
                format!(
                    "[INFO] POST /matches ({} v {} at {})",
                    payload.home_team_id, payload.away_team_id, payload.date
                ),
            );
            let result = api.create_match(&payload).map_err(describe);
            let refetch = result.is_ok();
            let _ = tx.send(Delta::FixtureScheduled { page, result });
            if refetch {
                send_fixtures(api, page, tx);
            }
        }
        ProviderCommand::RecordScore {
            page,
            match_id,
            payload,
        } => {
            log(
                tx,
                format!(
                    "[INFO] PATCH /matches/{match_id} ({}-{})",
                    payload.home_score, payload.away_score
                ),
            );
            let result = api.update_score(match_id, &payload).map_err(describe);
            let refetch = result.is_ok();
            let _ = tx.send(Delta::ScoreRecorded {
                page,
                match_id,
                result,
            });
            if refetch {
                send_fixtures(api, page, tx);
            }
        }
        ProviderCommand::AddPlayer {
            page,
            team_id,
            payload,
        } => {
            log(tx, format!("[INFO] POST /players ({})", payload.name));
            let result = api.create_player(&payload).map_err(describe);
            let refetch = result.is_ok();
            let _ = tx.send(Delta::PlayerAdded { page, result });
            if refetch {
                send_club(api, page, team_id, tx);
            }
        }
        ProviderCommand::ReleasePlayer {
            page,
            team_id,
            player_id,
        } => {
            log(tx, format!("[INFO] DELETE /players/{player_id}"));
            let result = api.delete_player(player_id).map_err(describe);
            let refetch = result.is_ok();
            let _ = tx.send(Delta::PlayerReleased {
                page,
                player_id,
                result,
            });
            if refetch {
                send_club(api, page, team_id, tx);
            }
        }
    }
}

/// Both requests run at once; if either fails the page gets neither.
fn load_home(api: &dyn LeagueApi, tx: &Sender<Delta>) -> (Vec<Standing>, Vec<Match>) {
    log(tx, "[INFO] GET /standings + /matches");
    let (standings, matches) = rayon::join(|| api.standings(), || api.matches());
    match both(standings, matches) {
        Ok(pair) => pair,
        Err(err) => {
            log(tx, format!("[WARN] Home fetch error: {err:#}"));
            (Vec::new(), Vec::new())
        }
    }
}

fn fetch_fixtures(api: &dyn LeagueApi, tx: &Sender<Delta>) -> (Vec<Match>, Vec<Team>) {
    log(tx, "[INFO] GET /matches + /teams");
    let (matches, teams) = rayon::join(|| api.matches(), || api.teams());
    match both(matches, teams) {
        Ok(pair) => pair,
        Err(err) => {
            log(tx, format!("[WARN] Fixtures fetch error: {err:#}"));
            (Vec::new(), Vec::new())
        }
    }
}

/// A failed lookup reads the same as a missing club.
fn fetch_club(api: &dyn LeagueApi, team_id: u32, tx: &Sender<Delta>) -> Option<Team> {
    log(tx, format!("[INFO] GET /teams/{team_id}"));
    match api.team(team_id) {
        Ok(team) => team,
        Err(err) => {
            log(tx, format!("[WARN] Club fetch error: {err:#}"));
            None
        }
    }
}

// Re-fetches after a mutation go out without the settle delay.
fn send_fixtures(api: &dyn LeagueApi, page: PageToken, tx: &Sender<Delta>) {
    let (matches, teams) = fetch_fixtures(api, tx);
    let _ = tx.send(Delta::FixturesLoaded {
        page,
        matches,
        teams,
    });
}

fn send_club(api: &dyn LeagueApi, page: PageToken, team_id: u32, tx: &Sender<Delta>) {
    let team = fetch_club(api, team_id, tx);
    let _ = tx.send(Delta::ClubLoaded { page, team });
}

fn both<A, B>(a: Result<A>, b: Result<B>) -> Result<(A, B)> {
    Ok((a?, b?))
}

fn settle(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

fn warn_empty<T>(tx: &Sender<Delta>, what: &str, err: anyhow::Error) -> Vec<T> {
    log(tx, format!("[WARN] {what} fetch error: {err:#}"));
    Vec::new()
}

fn describe(err: anyhow::Error) -> String {
    format!("{err:#}")
}

fn log(tx: &Sender<Delta>, msg: impl Into<String>) {
    let _ = tx.send(Delta::Log(msg.into()));
}
