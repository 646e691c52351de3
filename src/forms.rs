//! Management flows (create club, schedule fixture, record score, add or
//! release a player, delete a club) share one state machine:
//!
//! ```text
//! Idle -> Editing -> Submitting -> Success -> Idle
//!                             \-> Failure -> Editing (draft kept)
//! ```
//!
//! A draft only exists while Editing or Submitting, so "submitting with
//! nothing to submit" cannot be expressed.

use std::fmt;
use std::mem;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::model::{NewMatch, NewPlayer, NewTeam, Position, ScoreUpdate};

#[derive(Debug, Clone, PartialEq)]
pub enum Flow<D> {
    Idle,
    Editing(D),
    Submitting(D),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl<D> Default for Flow<D> {
    fn default() -> Self {
        Flow::Idle
    }
}

impl<D> Flow<D> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Flow::Idle)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Flow::Editing(_))
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Flow::Submitting(_))
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            Flow::Editing(d) | Flow::Submitting(d) => Some(d),
            Flow::Idle => None,
        }
    }

    /// Inputs are inert while a submission is in flight.
    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            Flow::Editing(d) => Some(d),
            _ => None,
        }
    }

    /// Idle -> Editing. Ignored when the flow is already open.
    pub fn open(&mut self, draft: D) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = Flow::Editing(draft);
        true
    }

    /// Editing -> Idle. A submission in flight cannot be cancelled.
    pub fn cancel(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        *self = Flow::Idle;
        true
    }

    /// Editing -> Submitting once `validate` accepts the draft. A rejected
    /// draft stays in Editing untouched.
    pub fn submit<R>(
        &mut self,
        validate: impl FnOnce(&D) -> Result<R, Rejection>,
    ) -> Result<R, Rejection> {
        let request = match self {
            Flow::Idle => return Err(Rejection::NotEditing),
            Flow::Submitting(_) => return Err(Rejection::Busy),
            Flow::Editing(draft) => validate(&*draft)?,
        };
        if let Flow::Editing(draft) = mem::replace(self, Flow::Idle) {
            *self = Flow::Submitting(draft);
        }
        Ok(request)
    }

    /// Submitting -> Idle on success, back to Editing with the same draft on
    /// failure. Returns false when nothing was in flight.
    pub fn finish(&mut self, outcome: Outcome) -> bool {
        if !self.is_submitting() {
            return false;
        }
        if let Flow::Submitting(draft) = mem::replace(self, Flow::Idle)
            && outcome == Outcome::Failure
        {
            *self = Flow::Editing(draft);
        }
        true
    }
}

/// Why a draft never reached the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotEditing,
    Busy,
    InvalidSelection,
    Missing(&'static str),
    NotANumber(&'static str),
    InvalidDate,
}

impl Rejection {
    /// Title and message for the user; `None` for rejections that simply
    /// make the control inert.
    pub fn describe(&self) -> Option<(&'static str, String)> {
        match self {
            Rejection::NotEditing | Rejection::Busy => None,
            Rejection::InvalidSelection => Some((
                "Invalid Selection",
                "Home Team and Away Team cannot be the same club.".to_string(),
            )),
            Rejection::Missing(field) => Some(("Missing Field", format!("Please fill in {field}."))),
            Rejection::NotANumber(field) => {
                Some(("Invalid Number", format!("{field} must be a whole number.")))
            }
            Rejection::InvalidDate => Some((
                "Invalid Date",
                "Enter kick-off as YYYY-MM-DD HH:MM.".to_string(),
            )),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotEditing => f.write_str("nothing to submit"),
            Rejection::Busy => f.write_str("submission already in flight"),
            Rejection::InvalidSelection => f.write_str("home and away team are the same"),
            Rejection::Missing(field) => write!(f, "{field} is required"),
            Rejection::NotANumber(field) => write!(f, "{field} is not a number"),
            Rejection::InvalidDate => f.write_str("kick-off is not a valid local date-time"),
        }
    }
}

impl std::error::Error for Rejection {}

/// Keyboard editing over a draft's fields.
pub trait FormFields {
    const LABELS: &'static [&'static str];

    fn focus(&self) -> usize;
    fn set_focus(&mut self, field: usize);
    fn value(&self, field: usize) -> String;
    fn input(&mut self, ch: char);
    fn erase(&mut self);

    fn next_field(&mut self) {
        let n = Self::LABELS.len();
        self.set_focus((self.focus() + 1) % n);
    }

    fn prev_field(&mut self) {
        let n = Self::LABELS.len();
        self.set_focus((self.focus() + n - 1) % n);
    }
}

fn required(value: &str, field: &'static str) -> Result<String, Rejection> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Rejection::Missing(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn number(value: &str, field: &'static str) -> Result<i32, Rejection> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| Rejection::NotANumber(field))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamDraft {
    pub name: String,
    pub logo: String,
    pub coach: String,
    pub stadium: String,
    pub founded: String,
    pub focus: usize,
}

impl TeamDraft {
    pub fn to_payload(&self) -> Result<NewTeam, Rejection> {
        let name = required(&self.name, "Club Name")?;
        let coach = required(&self.coach, "Manager")?;
        let founded = match optional(&self.founded) {
            Some(raw) => Some(number(&raw, "Founded Year")?),
            None => None,
        };
        Ok(NewTeam {
            name,
            logo: optional(&self.logo),
            coach,
            stadium: optional(&self.stadium),
            founded,
        })
    }

    fn field_mut(&mut self, field: usize) -> &mut String {
        match field {
            0 => &mut self.name,
            1 => &mut self.logo,
            2 => &mut self.coach,
            3 => &mut self.stadium,
            _ => &mut self.founded,
        }
    }
}

impl FormFields for TeamDraft {
    const LABELS: &'static [&'static str] =
        &["Club Name", "Logo URL", "Manager", "Stadium", "Founded Year"];

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, field: usize) {
        self.focus = field.min(Self::LABELS.len() - 1);
    }

    fn value(&self, field: usize) -> String {
        match field {
            0 => self.name.clone(),
            1 => self.logo.clone(),
            2 => self.coach.clone(),
            3 => self.stadium.clone(),
            _ => self.founded.clone(),
        }
    }

    fn input(&mut self, ch: char) {
        let field = self.focus;
        if field == 4 && !ch.is_ascii_digit() {
            return;
        }
        self.field_mut(field).push(ch);
    }

    fn erase(&mut self) {
        let field = self.focus;
        self.field_mut(field).pop();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixtureDraft {
    pub home_team_id: Option<u32>,
    pub away_team_id: Option<u32>,
    /// Wall-clock kick-off in the user's zone, `YYYY-MM-DD HH:MM`.
    pub kickoff: String,
    pub focus: usize,
}

impl FixtureDraft {
    pub const HOME: usize = 0;
    pub const AWAY: usize = 1;
    pub const KICKOFF: usize = 2;

    pub fn to_payload(&self) -> Result<NewMatch, Rejection> {
        self.to_payload_in(&Local)
    }

    /// Distinct teams are checked first, before any required-field checks.
    pub fn to_payload_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<NewMatch, Rejection> {
        if self.home_team_id == self.away_team_id {
            return Err(Rejection::InvalidSelection);
        }
        let home_team_id = self.home_team_id.ok_or(Rejection::Missing("Home Team"))?;
        let away_team_id = self.away_team_id.ok_or(Rejection::Missing("Away Team"))?;
        let kickoff = required(&self.kickoff, "Date & Kick Off")?;
        let date = local_to_utc_iso(&kickoff, tz).ok_or(Rejection::InvalidDate)?;
        Ok(NewMatch {
            home_team_id,
            away_team_id,
            date,
        })
    }

    /// Steps the focused team selector through `choices`, wrapping.
    pub fn cycle_team(&mut self, choices: &[u32], forward: bool) {
        if choices.is_empty() {
            return;
        }
        let slot = match self.focus {
            Self::HOME => &mut self.home_team_id,
            Self::AWAY => &mut self.away_team_id,
            _ => return,
        };
        let current = slot.and_then(|id| choices.iter().position(|c| *c == id));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => choices.len() - 1,
            (Some(idx), true) => (idx + 1) % choices.len(),
            (Some(idx), false) => (idx + choices.len() - 1) % choices.len(),
        };
        *slot = Some(choices[next]);
    }
}

impl FormFields for FixtureDraft {
    const LABELS: &'static [&'static str] = &["Home Team", "Away Team", "Date & Kick Off"];

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, field: usize) {
        self.focus = field.min(Self::LABELS.len() - 1);
    }

    fn value(&self, field: usize) -> String {
        match field {
            Self::HOME => self.home_team_id.map(|id| id.to_string()).unwrap_or_default(),
            Self::AWAY => self.away_team_id.map(|id| id.to_string()).unwrap_or_default(),
            _ => self.kickoff.clone(),
        }
    }

    fn input(&mut self, ch: char) {
        let allowed = ch.is_ascii_digit() || matches!(ch, '-' | ':' | ' ' | 'T');
        if self.focus == Self::KICKOFF && allowed {
            self.kickoff.push(ch);
        }
    }

    fn erase(&mut self) {
        match self.focus {
            Self::HOME => self.home_team_id = None,
            Self::AWAY => self.away_team_id = None,
            _ => {
                self.kickoff.pop();
            }
        }
    }
}

/// Converts a wall-clock time in `tz` to a UTC ISO-8601 instant with
/// millisecond precision. Times skipped by a DST jump have no instant.
pub fn local_to_utc_iso<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];
    let cleaned = raw.trim();
    let naive = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cleaned, fmt).ok())?;
    let local = tz.from_local_datetime(&naive).earliest()?;
    Some(
        local
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreSide {
    #[default]
    Home,
    Away,
}

/// Inline score entry. Both inputs start blank rather than at the current
/// score.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreDraft {
    pub home: String,
    pub away: String,
    pub side: ScoreSide,
}

impl ScoreDraft {
    /// Blank inputs count as 0.
    pub fn to_payload(&self) -> Result<ScoreUpdate, Rejection> {
        let parse = |raw: &str, field| {
            if raw.trim().is_empty() {
                Ok(0)
            } else {
                number(raw, field)
            }
        };
        Ok(ScoreUpdate::final_score(
            parse(&self.home, "Home score")?,
            parse(&self.away, "Away score")?,
        ))
    }
}

impl FormFields for ScoreDraft {
    const LABELS: &'static [&'static str] = &["Home", "Away"];

    fn focus(&self) -> usize {
        match self.side {
            ScoreSide::Home => 0,
            ScoreSide::Away => 1,
        }
    }

    fn set_focus(&mut self, field: usize) {
        self.side = if field == 0 {
            ScoreSide::Home
        } else {
            ScoreSide::Away
        };
    }

    fn value(&self, field: usize) -> String {
        if field == 0 {
            self.home.clone()
        } else {
            self.away.clone()
        }
    }

    fn input(&mut self, ch: char) {
        if !ch.is_ascii_digit() {
            return;
        }
        let slot = match self.side {
            ScoreSide::Home => &mut self.home,
            ScoreSide::Away => &mut self.away,
        };
        if slot.len() < 2 {
            slot.push(ch);
        }
    }

    fn erase(&mut self) {
        match self.side {
            ScoreSide::Home => self.home.pop(),
            ScoreSide::Away => self.away.pop(),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerDraft {
    pub name: String,
    pub number: String,
    pub position: Position,
    pub focus: usize,
}

impl Default for PlayerDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            number: String::new(),
            position: Position::Forward,
            focus: 0,
        }
    }
}

impl PlayerDraft {
    pub const POSITION: usize = 2;

    pub fn to_payload(&self, team_id: u32) -> Result<NewPlayer, Rejection> {
        let name = required(&self.name, "Player Name")?;
        let number = number(&required(&self.number, "Jersey No.")?, "Jersey No.")?;
        Ok(NewPlayer {
            name,
            number,
            position: self.position,
            team_id,
            photo: String::new(),
        })
    }
}

impl FormFields for PlayerDraft {
    const LABELS: &'static [&'static str] = &["Player Name", "Jersey No.", "Position"];

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, field: usize) {
        self.focus = field.min(Self::LABELS.len() - 1);
    }

    fn value(&self, field: usize) -> String {
        match field {
            0 => self.name.clone(),
            1 => self.number.clone(),
            _ => self.position.code().to_string(),
        }
    }

    fn input(&mut self, ch: char) {
        match self.focus {
            0 => self.name.push(ch),
            1 if ch.is_ascii_digit() && self.number.len() < 2 => self.number.push(ch),
            Self::POSITION if ch == ' ' => self.position = self.position.cycle(),
            _ => {}
        }
    }

    fn erase(&mut self) {
        match self.focus {
            0 => {
                self.name.pop();
            }
            1 => {
                self.number.pop();
            }
            _ => {}
        }
    }
}

/// What a destructive flow is about to remove, shown in its confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    Toast { until: Instant },
    Modal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub title: String,
    pub message: String,
    pub dismissal: Dismissal,
}

impl Notice {
    pub fn toast(tone: Tone, message: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        let title = match tone {
            Tone::Success => "Success",
            Tone::Danger => "Error",
        };
        Self {
            tone,
            title: title.to_string(),
            message: message.into(),
            dismissal: Dismissal::Toast { until: now + ttl },
        }
    }

    pub fn modal(tone: Tone, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tone,
            title: title.into(),
            message: message.into(),
            dismissal: Dismissal::Modal,
        }
    }

    pub fn is_modal(&self) -> bool {
        self.dismissal == Dismissal::Modal
    }

    pub fn expired(&self, now: Instant) -> bool {
        match self.dismissal {
            Dismissal::Toast { until } => now >= until,
            Dismissal::Modal => false,
        }
    }
}
