use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::forms::{
    DeleteTarget, FixtureDraft, Flow, FormFields, Notice, Outcome, PlayerDraft, Rejection,
    ScoreDraft, TeamDraft, Tone,
};
use crate::model::{Match, NewMatch, NewPlayer, NewTeam, Player, ScoreUpdate, Standing, Team};
use crate::store::Store;
use crate::views::{
    LineupMemo, MatchView, RECENT_MATCHES, StadiumIndex, StandingRow, enrich_matches,
    rank_standings, recent_matches,
};

const MAX_LOGS: usize = 200;

/// Identifies one visit to one screen. Results requested under an older
/// token belong to a page that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Clubs,
    Fixtures,
    Club { team_id: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct HomePage {
    pub loading: bool,
    pub standings: Store<StandingRow>,
    pub recent: Store<MatchView>,
}

#[derive(Debug, Clone, Default)]
pub struct ClubsPage {
    pub loading: bool,
    pub teams: Store<Team>,
    pub selected: usize,
    pub create: Flow<TeamDraft>,
    pub delete: Flow<DeleteTarget>,
}

#[derive(Debug, Clone, Default)]
pub struct FixturesPage {
    pub loading: bool,
    pub matches: Store<Match>,
    pub teams: Store<Team>,
    pub stadiums: StadiumIndex,
    pub selected: usize,
    pub schedule: Flow<FixtureDraft>,
    /// Each row edits its score independently.
    pub scores: HashMap<u32, Flow<ScoreDraft>>,
}

impl FixturesPage {
    pub fn selected_match(&self) -> Option<&Match> {
        self.matches.get(self.selected)
    }

    pub fn team_name(&self, team_id: u32) -> Option<&str> {
        self.teams
            .items()
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.as_str())
    }

    pub fn team_choices(&self) -> Vec<u32> {
        self.teams.items().iter().map(|t| t.id).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ClubPage {
    pub team_id: u32,
    pub loading: bool,
    /// Header data; the roster lives in `squad`.
    pub team: Option<Team>,
    pub squad: Store<Player>,
    pub lineup: LineupMemo,
    pub selected: usize,
    pub add: Flow<PlayerDraft>,
    pub release: Flow<DeleteTarget>,
}

impl ClubPage {
    fn new(team_id: u32) -> Self {
        Self {
            team_id,
            loading: true,
            team: None,
            squad: Store::default(),
            lineup: LineupMemo::default(),
            selected: 0,
            add: Flow::Idle,
            release: Flow::Idle,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Page {
    Home(HomePage),
    Clubs(ClubsPage),
    Fixtures(FixturesPage),
    Club(ClubPage),
}

impl Page {
    fn fresh(screen: Screen) -> Self {
        match screen {
            Screen::Home => Page::Home(HomePage {
                loading: true,
                ..HomePage::default()
            }),
            Screen::Clubs => Page::Clubs(ClubsPage {
                loading: true,
                ..ClubsPage::default()
            }),
            Screen::Fixtures => Page::Fixtures(FixturesPage {
                loading: true,
                ..FixturesPage::default()
            }),
            Screen::Club { team_id } => Page::Club(ClubPage::new(team_id)),
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            Page::Home(p) => p.loading,
            Page::Clubs(p) => p.loading,
            Page::Fixtures(p) => p.loading,
            Page::Club(p) => p.loading,
        }
    }
}

/// What currently owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Notice,
    Confirm,
    Form,
    Score,
}

/// The draft a keystroke edits.
pub enum ActiveDraft<'a> {
    Team(&'a mut TeamDraft),
    Fixture(&'a mut FixtureDraft, Vec<u32>),
    Player(&'a mut PlayerDraft),
    Score(&'a mut ScoreDraft),
}

macro_rules! with_draft {
    ($active:expr, $d:ident => $body:expr) => {
        match $active {
            ActiveDraft::Team($d) => $body,
            ActiveDraft::Fixture($d, _) => $body,
            ActiveDraft::Player($d) => $body,
            ActiveDraft::Score($d) => $body,
        }
    };
}

impl ActiveDraft<'_> {
    pub fn input(self, ch: char) {
        with_draft!(self, d => d.input(ch))
    }

    pub fn erase(self) {
        with_draft!(self, d => d.erase())
    }

    pub fn next_field(self) {
        with_draft!(self, d => d.next_field())
    }

    pub fn prev_field(self) {
        with_draft!(self, d => d.prev_field())
    }

    /// Left/Right on selector fields.
    pub fn cycle(self, forward: bool) {
        match self {
            ActiveDraft::Fixture(d, choices) => d.cycle_team(&choices, forward),
            ActiveDraft::Player(d) if d.focus == PlayerDraft::POSITION => {
                d.position = if forward {
                    d.position.cycle()
                } else {
                    d.position.cycle().cycle().cycle()
                };
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub token: PageToken,
    pub page: Page,
    pub notice: Option<Notice>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub toast_ttl: Duration,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            screen: Screen::Home,
            token: PageToken(0),
            page: Page::fresh(Screen::Home),
            notice: None,
            logs: VecDeque::new(),
            help_overlay: false,
            toast_ttl: settings.toast_ttl,
        }
    }

    /// Tears down the current page and mounts `screen` under a new token.
    /// The returned command loads its initial data.
    pub fn navigate(&mut self, screen: Screen) -> ProviderCommand {
        self.token = PageToken(self.token.0 + 1);
        self.screen = screen;
        self.page = Page::fresh(screen);
        self.notice = None;
        let page = self.token;
        match screen {
            Screen::Home => ProviderCommand::LoadHome { page },
            Screen::Clubs => ProviderCommand::LoadClubs { page },
            Screen::Fixtures => ProviderCommand::LoadFixtures { page },
            Screen::Club { team_id } => ProviderCommand::LoadClub { page, team_id },
        }
    }

    /// Club detail goes back to the directory, everything else to Home.
    pub fn back(&mut self) -> Option<ProviderCommand> {
        match self.screen {
            Screen::Home => None,
            Screen::Club { .. } => Some(self.navigate(Screen::Clubs)),
            Screen::Clubs | Screen::Fixtures => Some(self.navigate(Screen::Home)),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn overlay(&self) -> Overlay {
        if self.notice.as_ref().is_some_and(Notice::is_modal) {
            return Overlay::Notice;
        }
        match &self.page {
            Page::Home(_) => Overlay::None,
            Page::Clubs(p) if !p.delete.is_idle() => Overlay::Confirm,
            Page::Clubs(p) if !p.create.is_idle() => Overlay::Form,
            Page::Clubs(_) => Overlay::None,
            Page::Fixtures(p) if !p.schedule.is_idle() => Overlay::Form,
            Page::Fixtures(p) => {
                let editing = p
                    .selected_match()
                    .and_then(|m| p.scores.get(&m.id))
                    .is_some_and(|flow| !flow.is_idle());
                if editing {
                    Overlay::Score
                } else {
                    Overlay::None
                }
            }
            Page::Club(p) if !p.release.is_idle() => Overlay::Confirm,
            Page::Club(p) if !p.add.is_idle() => Overlay::Form,
            Page::Club(_) => Overlay::None,
        }
    }

    /// True while the flow behind the current overlay waits on the API.
    pub fn is_submitting(&self) -> bool {
        match &self.page {
            Page::Home(_) => false,
            Page::Clubs(p) => p.create.is_submitting() || p.delete.is_submitting(),
            Page::Fixtures(p) => {
                p.schedule.is_submitting()
                    || p.selected_match()
                        .and_then(|m| p.scores.get(&m.id))
                        .is_some_and(Flow::is_submitting)
            }
            Page::Club(p) => p.add.is_submitting() || p.release.is_submitting(),
        }
    }

    pub fn active_draft(&mut self) -> Option<ActiveDraft<'_>> {
        match &mut self.page {
            Page::Clubs(p) => p.create.draft_mut().map(ActiveDraft::Team),
            Page::Fixtures(p) => {
                if !p.schedule.is_idle() {
                    let choices = p.team_choices();
                    return p
                        .schedule
                        .draft_mut()
                        .map(|d| ActiveDraft::Fixture(d, choices));
                }
                let id = p.selected_match()?.id;
                p.scores
                    .get_mut(&id)
                    .and_then(Flow::draft_mut)
                    .map(ActiveDraft::Score)
            }
            Page::Club(p) => p.add.draft_mut().map(ActiveDraft::Player),
            Page::Home(_) => None,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expired(now)) {
            self.notice = None;
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn select_next(&mut self) {
        let (selected, len) = match &mut self.page {
            Page::Clubs(p) => (&mut p.selected, p.teams.len()),
            Page::Fixtures(p) => (&mut p.selected, p.matches.len()),
            Page::Club(p) => (&mut p.selected, p.squad.len()),
            Page::Home(_) => return,
        };
        if len > 0 && *selected + 1 < len {
            *selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        let selected = match &mut self.page {
            Page::Clubs(p) => &mut p.selected,
            Page::Fixtures(p) => &mut p.selected,
            Page::Club(p) => &mut p.selected,
            Page::Home(_) => return,
        };
        *selected = selected.saturating_sub(1);
    }

    pub fn open_selected_club(&mut self) -> Option<ProviderCommand> {
        let Page::Clubs(p) = &self.page else {
            return None;
        };
        let team_id = p.teams.get(p.selected)?.id;
        Some(self.navigate(Screen::Club { team_id }))
    }

    /// Opens the create form of the current page (club, fixture or player).
    pub fn open_form(&mut self) -> bool {
        match &mut self.page {
            Page::Clubs(p) => p.create.open(TeamDraft::default()),
            Page::Fixtures(p) => p.schedule.open(FixtureDraft::default()),
            Page::Club(p) if p.team.is_some() => p.add.open(PlayerDraft::default()),
            _ => false,
        }
    }

    pub fn close_form(&mut self) -> bool {
        match &mut self.page {
            Page::Clubs(p) => p.create.cancel(),
            Page::Fixtures(p) => p.schedule.cancel(),
            Page::Club(p) => p.add.cancel(),
            Page::Home(_) => false,
        }
    }

    pub fn submit_form(&mut self) -> Option<ProviderCommand> {
        let page = self.token;
        let result = match &mut self.page {
            Page::Clubs(p) => p
                .create
                .submit(TeamDraft::to_payload)
                .map(|payload| ProviderCommand::CreateClub { page, payload }),
            Page::Fixtures(p) => p
                .schedule
                .submit(FixtureDraft::to_payload)
                .map(|payload| ProviderCommand::ScheduleFixture { page, payload }),
            Page::Club(p) => {
                let team_id = p.team_id;
                p.add
                    .submit(|d| d.to_payload(team_id))
                    .map(|payload| ProviderCommand::AddPlayer {
                        page,
                        team_id,
                        payload,
                    })
            }
            Page::Home(_) => return None,
        };
        self.command_or_reject(result)
    }

    /// Opens the danger confirmation for the selected club or player.
    pub fn request_delete(&mut self) -> bool {
        match &mut self.page {
            Page::Clubs(p) => {
                let Some(team) = p.teams.get(p.selected) else {
                    return false;
                };
                let target = DeleteTarget {
                    id: team.id,
                    name: team.name.clone(),
                };
                p.delete.open(target)
            }
            Page::Club(p) => {
                let Some(player) = p.squad.get(p.selected) else {
                    return false;
                };
                let target = DeleteTarget {
                    id: player.id,
                    name: player.name.clone(),
                };
                p.release.open(target)
            }
            _ => false,
        }
    }

    /// Backs out of a confirmation. Nothing is sent.
    pub fn cancel_delete(&mut self) -> bool {
        match &mut self.page {
            Page::Clubs(p) => p.delete.cancel(),
            Page::Club(p) => p.release.cancel(),
            _ => false,
        }
    }

    pub fn confirm_delete(&mut self) -> Option<ProviderCommand> {
        let page = self.token;
        let result = match &mut self.page {
            Page::Clubs(p) => p
                .delete
                .submit(|target| Ok(target.id))
                .map(|team_id| ProviderCommand::DeleteClub { page, team_id }),
            Page::Club(p) => {
                let team_id = p.team_id;
                p.release
                    .submit(|target| Ok(target.id))
                    .map(|player_id| ProviderCommand::ReleasePlayer {
                        page,
                        team_id,
                        player_id,
                    })
            }
            _ => return None,
        };
        self.command_or_reject(result)
    }

    /// Enters or leaves score entry on the selected, unfinished match.
    pub fn toggle_score_edit(&mut self) -> bool {
        let Page::Fixtures(p) = &mut self.page else {
            return false;
        };
        let Some(m) = p.selected_match() else {
            return false;
        };
        if m.is_finished {
            return false;
        }
        let id = m.id;
        let flow = p.scores.entry(id).or_default();
        if flow.is_editing() {
            flow.cancel();
            p.scores.remove(&id);
            return true;
        }
        flow.open(ScoreDraft::default())
    }

    pub fn save_score(&mut self) -> Option<ProviderCommand> {
        let page = self.token;
        let Page::Fixtures(p) = &mut self.page else {
            return None;
        };
        let match_id = p.selected_match()?.id;
        let flow = p.scores.get_mut(&match_id)?;
        let result = flow
            .submit(ScoreDraft::to_payload)
            .map(|payload| ProviderCommand::RecordScore {
                page,
                match_id,
                payload,
            });
        self.command_or_reject(result)
    }

    fn command_or_reject(
        &mut self,
        result: Result<ProviderCommand, Rejection>,
    ) -> Option<ProviderCommand> {
        match result {
            Ok(cmd) => Some(cmd),
            Err(rejection) => {
                if let Some((title, message)) = rejection.describe() {
                    self.push_log(format!("[INFO] Not submitted: {rejection}"));
                    self.notice = Some(self.notice_for(Tone::Danger, title, message));
                }
                None
            }
        }
    }

    /// The club directory uses self-dismissing toasts; the other pages use
    /// modals that wait for the user.
    fn notice_for(&self, tone: Tone, title: &str, message: impl Into<String>) -> Notice {
        match self.page {
            Page::Clubs(_) => Notice::toast(tone, message, Instant::now(), self.toast_ttl),
            _ => Notice::modal(tone, title, message),
        }
    }

    fn current(&self, token: PageToken) -> bool {
        self.token == token
    }

    fn drop_stale(&mut self, what: &str, token: PageToken) {
        self.push_log(format!(
            "[INFO] Ignored {what} for closed page #{}",
            token.0
        ));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    LoadHome {
        page: PageToken,
    },
    LoadClubs {
        page: PageToken,
    },
    LoadFixtures {
        page: PageToken,
    },
    LoadClub {
        page: PageToken,
        team_id: u32,
    },
    CreateClub {
        page: PageToken,
        payload: NewTeam,
    },
    DeleteClub {
        page: PageToken,
        team_id: u32,
    },
    ScheduleFixture {
        page: PageToken,
        payload: NewMatch,
    },
    RecordScore {
        page: PageToken,
        match_id: u32,
        payload: ScoreUpdate,
    },
    AddPlayer {
        page: PageToken,
        team_id: u32,
        payload: NewPlayer,
    },
    ReleasePlayer {
        page: PageToken,
        team_id: u32,
        player_id: u32,
    },
}

/// Results flowing back from the provider. Failed loads arrive as empty
/// collections (or `team: None`); the error itself comes as a `Log`.
#[derive(Debug, Clone)]
pub enum Delta {
    HomeLoaded {
        page: PageToken,
        standings: Vec<Standing>,
        matches: Vec<Match>,
    },
    ClubsLoaded {
        page: PageToken,
        teams: Vec<Team>,
    },
    FixturesLoaded {
        page: PageToken,
        matches: Vec<Match>,
        teams: Vec<Team>,
    },
    ClubLoaded {
        page: PageToken,
        team: Option<Team>,
    },
    ClubCreated {
        page: PageToken,
        result: Result<Team, String>,
    },
    ClubDeleted {
        page: PageToken,
        team_id: u32,
        result: Result<(), String>,
    },
    FixtureScheduled {
        page: PageToken,
        result: Result<Match, String>,
    },
    ScoreRecorded {
        page: PageToken,
        match_id: u32,
        result: Result<Match, String>,
    },
    PlayerAdded {
        page: PageToken,
        result: Result<Player, String>,
    },
    PlayerReleased {
        page: PageToken,
        player_id: u32,
        result: Result<(), String>,
    },
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::HomeLoaded {
            page,
            standings,
            matches,
        } => {
            let Some(Page::Home(home)) = page_for(state, page) else {
                state.drop_stale("home data", page);
                return;
            };
            let index = StadiumIndex::from_standings(&standings);
            let recent = recent_matches(enrich_matches(&matches, &index), RECENT_MATCHES);
            let rows = rank_standings(&standings, &mut rand::thread_rng());
            home.standings.replace(rows);
            home.recent.replace(recent);
            home.loading = false;
        }
        Delta::ClubsLoaded { page, teams } => {
            let Some(Page::Clubs(clubs)) = page_for(state, page) else {
                state.drop_stale("club list", page);
                return;
            };
            clubs.teams.replace(teams);
            clubs.selected = clamp_index(clubs.selected, clubs.teams.len());
            clubs.loading = false;
        }
        Delta::FixturesLoaded {
            page,
            matches,
            teams,
        } => {
            let Some(Page::Fixtures(fixtures)) = page_for(state, page) else {
                state.drop_stale("fixture list", page);
                return;
            };
            fixtures.stadiums = StadiumIndex::from_teams(&teams);
            fixtures.scores.retain(|id, _| matches.iter().any(|m| m.id == *id));
            fixtures.matches.replace(matches);
            fixtures.teams.replace(teams);
            fixtures.selected = clamp_index(fixtures.selected, fixtures.matches.len());
            fixtures.loading = false;
        }
        Delta::ClubLoaded { page, team } => {
            let Some(Page::Club(club)) = page_for(state, page) else {
                state.drop_stale("club detail", page);
                return;
            };
            let (team, players) = match team {
                Some(mut team) => {
                    let players = team.players.take().unwrap_or_default();
                    (Some(team), players)
                }
                None => (None, Vec::new()),
            };
            club.team = team;
            club.squad.replace(players);
            club.lineup.get(&club.squad);
            club.selected = clamp_index(club.selected, club.squad.len());
            club.loading = false;
        }
        Delta::ClubCreated { page, result } => {
            let Some(Page::Clubs(clubs)) = page_for(state, page) else {
                state.drop_stale("club creation", page);
                return;
            };
            let (tone, message, err) = match result {
                Ok(team) => {
                    clubs.teams.append(team);
                    clubs.create.finish(Outcome::Success);
                    (Tone::Success, "Club added successfully!", None)
                }
                Err(err) => {
                    clubs.create.finish(Outcome::Failure);
                    (
                        Tone::Danger,
                        "Failed to create club. Please try again.",
                        Some(err),
                    )
                }
            };
            report(state, tone, "", message, err);
        }
        Delta::ClubDeleted {
            page,
            team_id,
            result,
        } => {
            let Some(Page::Clubs(clubs)) = page_for(state, page) else {
                state.drop_stale("club deletion", page);
                return;
            };
            let (tone, message, err) = match result {
                Ok(()) => {
                    clubs.teams.remove_where(|t| t.id == team_id);
                    clubs.selected = clamp_index(clubs.selected, clubs.teams.len());
                    clubs.delete.finish(Outcome::Success);
                    (Tone::Success, "Club deleted successfully!", None)
                }
                Err(err) => {
                    clubs.delete.finish(Outcome::Failure);
                    (
                        Tone::Danger,
                        "Failed to delete club. Please try again.",
                        Some(err),
                    )
                }
            };
            report(state, tone, "", message, err);
        }
        Delta::FixtureScheduled { page, result } => {
            let Some(Page::Fixtures(fixtures)) = page_for(state, page) else {
                state.drop_stale("fixture scheduling", page);
                return;
            };
            match result {
                Ok(_) => {
                    fixtures.schedule.finish(Outcome::Success);
                    report(
                        state,
                        Tone::Success,
                        "Success",
                        "Match scheduled successfully.",
                        None,
                    );
                }
                Err(err) => {
                    fixtures.schedule.finish(Outcome::Failure);
                    report(
                        state,
                        Tone::Danger,
                        "Error",
                        "Failed to schedule match.",
                        Some(err),
                    );
                }
            }
        }
        Delta::ScoreRecorded {
            page,
            match_id,
            result,
        } => {
            let Some(Page::Fixtures(fixtures)) = page_for(state, page) else {
                state.drop_stale("score update", page);
                return;
            };
            match result {
                Ok(mut updated) => {
                    if let Some(flow) = fixtures.scores.get_mut(&match_id) {
                        flow.finish(Outcome::Success);
                    }
                    fixtures.scores.remove(&match_id);
                    if let Some(existing) =
                        fixtures.matches.items().iter().find(|m| m.id == match_id)
                    {
                        // PATCH responses do not embed the teams.
                        if updated.home_team.is_none() {
                            updated.home_team = existing.home_team.clone();
                        }
                        if updated.away_team.is_none() {
                            updated.away_team = existing.away_team.clone();
                        }
                    }
                    fixtures
                        .matches
                        .replace_where(|m| m.id == match_id, updated);
                }
                Err(err) => {
                    if let Some(flow) = fixtures.scores.get_mut(&match_id) {
                        flow.finish(Outcome::Failure);
                    }
                    report(
                        state,
                        Tone::Danger,
                        "Error",
                        "Failed to update score.",
                        Some(err),
                    );
                }
            }
        }
        Delta::PlayerAdded { page, result } => {
            let Some(Page::Club(club)) = page_for(state, page) else {
                state.drop_stale("player signing", page);
                return;
            };
            match result {
                Ok(_) => {
                    club.add.finish(Outcome::Success);
                    report(
                        state,
                        Tone::Success,
                        "Success",
                        "New player added to squad successfully.",
                        None,
                    );
                }
                Err(err) => {
                    club.add.finish(Outcome::Failure);
                    report(
                        state,
                        Tone::Danger,
                        "Error",
                        "Failed to add player. Please check the input.",
                        Some(err),
                    );
                }
            }
        }
        Delta::PlayerReleased {
            page,
            player_id,
            result,
        } => {
            let Some(Page::Club(club)) = page_for(state, page) else {
                state.drop_stale("player release", page);
                return;
            };
            match result {
                Ok(()) => {
                    club.release.finish(Outcome::Success);
                    state.push_log(format!("[INFO] Player #{player_id} released"));
                    report(
                        state,
                        Tone::Success,
                        "Removed",
                        "Player successfully removed from squad.",
                        None,
                    );
                }
                Err(err) => {
                    club.release.finish(Outcome::Failure);
                    report(
                        state,
                        Tone::Danger,
                        "Error",
                        "Failed to remove player.",
                        Some(err),
                    );
                }
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn page_for(state: &mut AppState, token: PageToken) -> Option<&mut Page> {
    if !state.current(token) {
        return None;
    }
    Some(&mut state.page)
}

fn report(state: &mut AppState, tone: Tone, title: &str, message: &str, err: Option<String>) {
    if let Some(err) = err {
        state.push_log(format!("[WARN] {message} ({err})"));
    }
    state.notice = Some(state.notice_for(tone, title, message));
}

fn clamp_index(idx: usize, len: usize) -> usize {
    if len == 0 { 0 } else { idx.min(len - 1) }
}
