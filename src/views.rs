use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use rand::Rng;

use crate::model::{Match, Player, Position, Standing, Team};
use crate::store::Store;

pub const STADIUM_UNKNOWN: &str = "Stadium Unknown";
pub const RECENT_MATCHES: usize = 4;
pub const STARTING_XI: usize = 11;
pub const FORM_GUIDE_LEN: usize = 5;

/// Home-team stadium lookup, built once per fetch.
///
/// Keeps the first record seen for each id, the same record a linear `find`
/// would have picked.
#[derive(Debug, Clone, Default)]
pub struct StadiumIndex {
    by_team: HashMap<u32, Option<String>>,
}

impl StadiumIndex {
    pub fn from_standings(standings: &[Standing]) -> Self {
        let mut by_team = HashMap::new();
        for row in standings {
            if let Some(id) = row.team.id {
                by_team.entry(id).or_insert_with(|| row.team.stadium.clone());
            }
        }
        Self { by_team }
    }

    pub fn from_teams(teams: &[Team]) -> Self {
        let mut by_team = HashMap::new();
        for team in teams {
            by_team
                .entry(team.id)
                .or_insert_with(|| team.stadium.clone());
        }
        Self { by_team }
    }

    /// Never fails: unknown teams and blank stadiums read as the placeholder.
    pub fn stadium_for(&self, team_id: u32) -> &str {
        self.by_team
            .get(&team_id)
            .and_then(|s| s.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(STADIUM_UNKNOWN)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchView {
    pub fixture: Match,
    pub stadium: String,
}

pub fn enrich_matches(matches: &[Match], index: &StadiumIndex) -> Vec<MatchView> {
    matches
        .iter()
        .map(|m| {
            let stadium = index.stadium_for(m.home_team_id).to_string();
            let mut fixture = m.clone();
            if let Some(home) = fixture.home_team.as_mut() {
                home.stadium = Some(stadium.clone());
            }
            MatchView { fixture, stadium }
        })
        .collect()
}

/// Newest first, at most `limit`. Unparseable dates sink to the end; equal
/// dates have no defined order.
pub fn recent_matches(mut views: Vec<MatchView>, limit: usize) -> Vec<MatchView> {
    views.sort_by_key(|v| std::cmp::Reverse(parse_kickoff(&v.fixture.date)));
    views.truncate(limit);
    views
}

pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cleaned, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lineup {
    pub starters: Vec<Player>,
    pub bench: Vec<Player>,
}

impl Lineup {
    /// Starters playing `pos`, in roster order.
    pub fn line(&self, pos: Position) -> Vec<&Player> {
        self.starters.iter().filter(|p| p.position == pos).collect()
    }

    /// Starters whose position is none of GK/DF/MF/FW.
    pub fn unplaced(&self) -> Vec<&Player> {
        self.line(Position::Unknown)
    }
}

/// First eleven in roster order start, the rest sit on the bench. There is no
/// starter flag, so a newly added player lands on the bench once eleven exist.
pub fn partition_lineup(players: &[Player]) -> Lineup {
    let split = players.len().min(STARTING_XI);
    Lineup {
        starters: players[..split].to_vec(),
        bench: players[split..].to_vec(),
    }
}

/// Recomputes the lineup only when the squad store has been written to.
#[derive(Debug, Clone, Default)]
pub struct LineupMemo {
    revision: Option<u64>,
    lineup: Lineup,
}

impl LineupMemo {
    pub fn get(&mut self, squad: &Store<Player>) -> &Lineup {
        if self.revision != Some(squad.revision()) {
            self.lineup = partition_lineup(squad.items());
            self.revision = Some(squad.revision());
        }
        &self.lineup
    }

    pub fn cached(&self) -> &Lineup {
        &self.lineup
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl fmt::Display for FormResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            FormResult::Win => "W",
            FormResult::Draw => "D",
            FormResult::Loss => "L",
        };
        f.write_str(c)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingRow {
    /// 1-based, taken from the row's position in the API response.
    pub rank: usize,
    pub zone: Zone,
    pub standing: Standing,
    pub form: Vec<FormResult>,
}

/// Ranks rows by position; the API order is trusted and never re-sorted.
pub fn rank_standings(standings: &[Standing], rng: &mut impl Rng) -> Vec<StandingRow> {
    let total = standings.len();
    standings
        .iter()
        .enumerate()
        .map(|(idx, standing)| {
            let rank = idx + 1;
            let zone = if rank <= 4 {
                Zone::Top
            } else if rank >= total.saturating_sub(2) {
                Zone::Bottom
            } else {
                Zone::Middle
            };
            StandingRow {
                rank,
                zone,
                standing: standing.clone(),
                form: form_guide(rng),
            }
        })
        .collect()
}

/// Decorative form column; the API has no per-match history for it.
pub fn form_guide(rng: &mut impl Rng) -> Vec<FormResult> {
    (0..FORM_GUIDE_LEN)
        .map(|_| {
            if rng.gen_bool(0.5) {
                FormResult::Win
            } else if rng.gen_bool(0.5) {
                FormResult::Draw
            } else {
                FormResult::Loss
            }
        })
        .collect()
}

pub fn goal_difference_label(gd: i32) -> String {
    if gd > 0 {
        format!("+{gd}")
    } else {
        gd.to_string()
    }
}

pub fn status_label(m: &Match) -> &'static str {
    if m.is_finished { "FT" } else { "Live" }
}

/// `"2 - 1"` for finished matches. Missing scores read as 0.
pub fn score_label(m: &Match) -> Option<String> {
    if !m.is_finished {
        return None;
    }
    Some(format!(
        "{} - {}",
        m.home_score.unwrap_or(0),
        m.away_score.unwrap_or(0)
    ))
}

pub fn kickoff_day_label(raw: &str) -> String {
    kickoff_day_label_in(raw, &Local)
}

pub fn kickoff_time_label(raw: &str) -> String {
    kickoff_time_label_in(raw, &Local)
}

pub fn kickoff_day_label_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    match parse_kickoff(raw) {
        Some(dt) => dt.with_timezone(tz).format("%a %-d %b").to_string(),
        None => "TBD".to_string(),
    }
}

pub fn kickoff_time_label_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    match parse_kickoff(raw) {
        Some(dt) => dt.with_timezone(tz).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}
