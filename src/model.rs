use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DF")]
    Defender,
    #[serde(rename = "MF")]
    Midfielder,
    #[serde(rename = "FW")]
    Forward,
    // Anything the API sends outside GK/DF/MF/FW.
    #[serde(other)]
    Unknown,
}

impl Position {
    pub const PITCH_ORDER: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DF",
            Position::Midfielder => "MF",
            Position::Forward => "FW",
            Position::Unknown => "??",
        }
    }

    /// Next selectable position in the squad form, wrapping FW -> GK.
    pub fn cycle(self) -> Position {
        match self {
            Position::Goalkeeper => Position::Defender,
            Position::Defender => Position::Midfielder,
            Position::Midfielder => Position::Forward,
            Position::Forward | Position::Unknown => Position::Goalkeeper,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub position: Position,
    pub number: i32,
    #[serde(default)]
    pub photo: Option<String>,
    // Foreign key only; the team may no longer exist.
    pub team_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub coach: String,
    #[serde(default)]
    pub stadium: Option<String>,
    #[serde(default)]
    pub founded: Option<i32>,
    #[serde(default)]
    pub players: Option<Vec<Player>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: u32,
    /// ISO-8601 instant as stored by the API.
    pub date: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    #[serde(default)]
    pub home_score: Option<i32>,
    #[serde(default)]
    pub away_score: Option<i32>,
    #[serde(default)]
    pub is_finished: bool,
    // Embedded by the list endpoint, usually absent on create/patch responses.
    #[serde(default)]
    pub home_team: Option<Team>,
    #[serde(default)]
    pub away_team: Option<Team>,
}

impl Match {
    pub fn home_name(&self) -> &str {
        self.home_team.as_ref().map(|t| t.name.as_str()).unwrap_or("TBD")
    }

    pub fn away_name(&self) -> &str {
        self.away_team.as_ref().map(|t| t.name.as_str()).unwrap_or("TBD")
    }
}

/// The minimal team snapshot embedded in a standing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingTeam {
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub stadium: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub id: u32,
    pub team: StandingTeam,
    #[serde(default)]
    pub played: i32,
    #[serde(default)]
    pub won: i32,
    #[serde(default)]
    pub drawn: i32,
    #[serde(default)]
    pub lost: i32,
    #[serde(default)]
    pub goals_for: i32,
    #[serde(default)]
    pub goals_against: i32,
    #[serde(default)]
    pub points: i32,
}

impl Standing {
    pub fn goal_difference(&self) -> i32 {
        self.goals_for - self.goals_against
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub coach: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stadium: Option<String>,
    pub founded: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub home_team_id: u32,
    pub away_team_id: u32,
    /// Absolute UTC instant, e.g. `2025-08-16T14:00:00.000Z`.
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub home_score: i32,
    pub away_score: i32,
    pub is_finished: bool,
}

impl ScoreUpdate {
    pub fn final_score(home_score: i32, away_score: i32) -> Self {
        Self {
            home_score,
            away_score,
            is_finished: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub name: String,
    pub number: i32,
    pub position: Position,
    pub team_id: u32,
    // The API expects an empty string rather than null.
    pub photo: String,
}
