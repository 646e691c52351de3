use std::io;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use matchday_terminal::api::{ApiClient, LeagueApi};
use matchday_terminal::config::Settings;
use matchday_terminal::forms::{
    Dismissal, FixtureDraft, Flow, FormFields, Notice, ScoreDraft, ScoreSide, Tone,
};
use matchday_terminal::model::{Match, Position};
use matchday_terminal::provider::spawn_provider;
use matchday_terminal::state::{
    ActiveDraft, AppState, ClubPage, ClubsPage, FixturesPage, HomePage, Overlay, Page,
    ProviderCommand, Screen, apply_delta,
};
use matchday_terminal::views::{
    Lineup, STADIUM_UNKNOWN, Zone, goal_difference_label, kickoff_day_label,
    kickoff_time_label, score_label, status_label,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    tick_rate: Duration,
}

impl App {
    fn new(settings: &Settings, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::with_settings(settings),
            should_quit: false,
            cmd_tx,
            tick_rate: settings.tick_rate,
        }
    }

    fn go(&mut self, screen: Screen) {
        let cmd = self.state.navigate(screen);
        self.send(Some(cmd));
    }

    fn send(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider request failed");
        }
    }

    fn edit(&mut self, apply: impl FnOnce(ActiveDraft<'_>)) {
        if let Some(draft) = self.state.active_draft() {
            apply(draft);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.state.help_overlay = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }
        let overlay = self.state.overlay();
        if matches!(overlay, Overlay::Confirm | Overlay::Form | Overlay::Score)
            && self.state.is_submitting()
        {
            self.on_busy_key(key);
            return;
        }
        match overlay {
            Overlay::Notice => self.on_notice_key(key),
            Overlay::Confirm => self.on_confirm_key(key),
            Overlay::Form => self.on_form_key(key),
            Overlay::Score => self.on_score_key(key),
            Overlay::None => self.on_page_key(key),
        }
    }

    fn on_page_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.go(Screen::Home),
            KeyCode::Char('2') => self.go(Screen::Clubs),
            KeyCode::Char('3') => self.go(Screen::Fixtures),
            KeyCode::Char('r') => self.go(self.state.screen),
            KeyCode::Char('b') | KeyCode::Esc => {
                let cmd = self.state.back();
                self.send(cmd);
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter => {
                let cmd = self.state.open_selected_club();
                self.send(cmd);
            }
            KeyCode::Char('n') => {
                if !self.state.open_form() {
                    self.state.push_log("[INFO] Nothing to create here");
                }
            }
            KeyCode::Char('x') => {
                self.state.request_delete();
            }
            KeyCode::Char('e') => {
                self.state.toggle_score_edit();
            }
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    // The draft is locked while its request is out, but the page can still
    // be left; a late reply for it is dropped by token.
    fn on_busy_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.go(Screen::Home),
            KeyCode::Char('2') => self.go(Screen::Clubs),
            KeyCode::Char('3') => self.go(Screen::Fixtures),
            KeyCode::Char('b') | KeyCode::Esc => {
                let cmd = self.state.back();
                self.send(cmd);
            }
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_notice_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            self.state.dismiss_notice();
        }
    }

    fn on_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let cmd = self.state.confirm_delete();
                self.send(cmd);
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.state.cancel_delete();
            }
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.close_form();
            }
            KeyCode::Enter => {
                let cmd = self.state.submit_form();
                self.send(cmd);
            }
            KeyCode::Tab | KeyCode::Down => self.edit(|d| d.next_field()),
            KeyCode::BackTab | KeyCode::Up => self.edit(|d| d.prev_field()),
            KeyCode::Left => self.edit(|d| d.cycle(false)),
            KeyCode::Right => self.edit(|d| d.cycle(true)),
            KeyCode::Backspace => self.edit(|d| d.erase()),
            KeyCode::Char(c) => self.edit(|d| d.input(c)),
            _ => {}
        }
    }

    fn on_score_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.toggle_score_edit();
            }
            KeyCode::Enter => {
                let cmd = self.state.save_score();
                self.send(cmd);
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.edit(|d| d.next_field())
            }
            KeyCode::Backspace => self.edit(|d| d.erase()),
            KeyCode::Char(c) => self.edit(|d| d.input(c)),
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let settings = Settings::from_env();
    let api = ApiClient::new(&settings.api_url, settings.request_timeout)
        .map_err(|err| io::Error::other(format!("{err:#}")))?;
    let base_url = api.base_url().to_string();
    let api: Arc<dyn LeagueApi> = Arc::new(api);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(api, settings.loading_delay, tx, cmd_rx);

    let mut app = App::new(&settings, Some(cmd_tx));
    app.state.push_log(format!("[INFO] API: {base_url}"));
    app.go(Screen::Home);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<matchday_terminal::state::Delta>,
) -> io::Result<()> {
    let tick_rate = app.tick_rate;
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            app.state.tick(Instant::now());
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.state.page {
        Page::Home(page) => render_home(frame, chunks[1], page),
        Page::Clubs(page) => render_clubs(frame, chunks[1], page),
        Page::Fixtures(page) => render_fixtures(frame, chunks[1], page),
        Page::Club(page) => render_club(frame, chunks[1], page),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[3]);

    let area = frame.size();
    match app.state.overlay() {
        Overlay::Form => render_form(frame, area, &app.state.page),
        Overlay::Confirm => render_confirm(frame, area, &app.state.page),
        _ => {}
    }
    if let Some(notice) = &app.state.notice {
        match notice.dismissal {
            Dismissal::Modal => render_modal(frame, area, notice),
            Dismissal::Toast { .. } => render_toast(frame, area, notice),
        }
    }
    if app.state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let title = match (&state.screen, &state.page) {
        (Screen::Home, _) => "HOME | League Table".to_string(),
        (Screen::Clubs, _) => "CLUBS | Directory".to_string(),
        (Screen::Fixtures, _) => "FIXTURES | Match Centre".to_string(),
        (Screen::Club { team_id }, Page::Club(page)) => match &page.team {
            Some(team) => format!("CLUB | {}", team.name),
            None => format!("CLUB | #{team_id}"),
        },
        (Screen::Club { team_id }, _) => format!("CLUB | #{team_id}"),
    };
    let status = if state.page.is_loading() {
        " | Loading..."
    } else {
        ""
    };
    let line1 = format!("  .-.  MATCHDAY | {title}{status}");
    let line2 = " ( o )".to_string();
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Home => "1 Home | 2 Clubs | 3 Fixtures | r Reload | ? Help | q Quit".to_string(),
        Screen::Clubs => {
            "j/k Move | Enter Open | n New Club | x Delete | b Back | ? Help | q Quit".to_string()
        }
        Screen::Fixtures => {
            "j/k Move | n New Fixture | e Edit Score | b Back | ? Help | q Quit".to_string()
        }
        Screen::Club { .. } => {
            "j/k Move | n Add Player | x Release | b Clubs | ? Help | q Quit".to_string()
        }
    }
}

fn loading(frame: &mut Frame, area: Rect, what: &str) {
    let text = Paragraph::new(format!("Loading {what}..."))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(text, area);
}

fn empty(frame: &mut Frame, area: Rect, title: &str, text: &str) {
    let text = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(text, area);
}

fn render_home(frame: &mut Frame, area: Rect, page: &HomePage) {
    if page.loading {
        loading(frame, area, "league table");
        return;
    }
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(6)])
        .split(area);

    if page.standings.is_empty() {
        empty(frame, sections[0], "League Table", "No standings available.");
    } else {
        let header = Row::new(["#", "Club", "P", "W", "D", "L", "GD", "Pts", "Form"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = page.standings.items().iter().map(|row| {
            let s = &row.standing;
            let form = row
                .form
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            Row::new(vec![
                Cell::from(row.rank.to_string()).style(zone_style(row.zone)),
                Cell::from(s.team.name.clone()),
                Cell::from(s.played.to_string()),
                Cell::from(s.won.to_string()),
                Cell::from(s.drawn.to_string()),
                Cell::from(s.lost.to_string()),
                Cell::from(goal_difference_label(s.goal_difference())),
                Cell::from(s.points.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(form),
            ])
        });
        let widths = [
            Constraint::Length(3),
            Constraint::Min(18),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(10),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title("League Table").borders(Borders::ALL));
        frame.render_widget(table, sections[0]);
    }

    let recent = if page.recent.is_empty() {
        "No matches scheduled recently.".to_string()
    } else {
        page.recent
            .items()
            .iter()
            .map(|view| {
                let m = &view.fixture;
                format!(
                    "{} {}  {} {} {}  {}  @ {}",
                    kickoff_day_label(&m.date),
                    kickoff_time_label(&m.date),
                    m.home_name(),
                    score_label(m).unwrap_or_else(|| "vs".to_string()),
                    m.away_name(),
                    status_label(m),
                    view.stadium
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let recent = Paragraph::new(recent)
        .block(Block::default().title("Match Centre").borders(Borders::ALL));
    frame.render_widget(recent, sections[1]);
}

fn zone_style(zone: Zone) -> Style {
    match zone {
        Zone::Top => Style::default().fg(Color::Green),
        Zone::Middle => Style::default(),
        Zone::Bottom => Style::default().fg(Color::Red),
    }
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn render_clubs(frame: &mut Frame, area: Rect, page: &ClubsPage) {
    if page.loading {
        loading(frame, area, "clubs");
        return;
    }
    if page.teams.is_empty() {
        empty(frame, area, "Clubs", "No clubs yet. Press n to add one.");
        return;
    }
    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(page.selected, page.teams.len(), visible);
    let rows = page.teams.items()[start..end]
        .iter()
        .enumerate()
        .map(|(offset, team)| {
            Row::new(vec![
                team.name.clone(),
                team.coach.clone(),
                team.stadium
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| STADIUM_UNKNOWN.to_string()),
                team.founded
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ])
            .style(selected_style(start + offset == page.selected))
        });
    let header = Row::new(["Club", "Manager", "Stadium", "Founded"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Min(20),
        Constraint::Min(16),
        Constraint::Min(20),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!("Clubs ({})", page.teams.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn side_name<'a>(page: &'a FixturesPage, embedded: Option<&'a str>, team_id: u32) -> &'a str {
    embedded
        .or_else(|| page.team_name(team_id))
        .unwrap_or("TBD")
}

fn score_cell(m: &Match, flow: Option<&Flow<ScoreDraft>>) -> String {
    match flow {
        Some(Flow::Editing(draft)) => {
            let slot = |value: &str, side: ScoreSide| {
                let shown = if value.is_empty() { "_" } else { value };
                if draft.side == side {
                    format!("[{shown}]")
                } else {
                    format!(" {shown} ")
                }
            };
            format!(
                "{}-{}",
                slot(&draft.home, ScoreSide::Home),
                slot(&draft.away, ScoreSide::Away)
            )
        }
        Some(Flow::Submitting(_)) => "Saving...".to_string(),
        _ => score_label(m).unwrap_or_else(|| kickoff_time_label(&m.date)),
    }
}

fn render_fixtures(frame: &mut Frame, area: Rect, page: &FixturesPage) {
    if page.loading {
        loading(frame, area, "fixtures");
        return;
    }
    if page.matches.is_empty() {
        empty(frame, area, "Fixtures", "No fixtures yet. Press n to schedule one.");
        return;
    }
    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(page.selected, page.matches.len(), visible);
    let rows = page.matches.items()[start..end]
        .iter()
        .enumerate()
        .map(|(offset, m)| {
            let home = side_name(page, m.home_team.as_ref().map(|t| t.name.as_str()), m.home_team_id);
            let away = side_name(page, m.away_team.as_ref().map(|t| t.name.as_str()), m.away_team_id);
            let status_style = if m.is_finished {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::Green)
            };
            Row::new(vec![
                Cell::from(kickoff_day_label(&m.date)),
                Cell::from(home.to_string()),
                Cell::from(score_cell(m, page.scores.get(&m.id))),
                Cell::from(away.to_string()),
                Cell::from(status_label(m)).style(status_style),
                Cell::from(page.stadiums.stadium_for(m.home_team_id).to_string()),
            ])
            .style(selected_style(start + offset == page.selected))
        });
    let header = Row::new(["Date", "Home", "Score", "Away", "Status", "Stadium"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(11),
        Constraint::Min(14),
        Constraint::Length(11),
        Constraint::Min(14),
        Constraint::Length(6),
        Constraint::Min(16),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!("Fixtures ({})", page.matches.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn render_club(frame: &mut Frame, area: Rect, page: &ClubPage) {
    if page.loading {
        loading(frame, area, "club");
        return;
    }
    let Some(team) = &page.team else {
        empty(frame, area, "Club", "Club not found");
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(area);
    let info = format!(
        "Manager: {}\nStadium: {}\nFounded: {} | Squad: {} players",
        if team.coach.is_empty() { "-" } else { &team.coach },
        team.stadium
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(STADIUM_UNKNOWN),
        team.founded
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string()),
        page.squad.len()
    );
    let info = Paragraph::new(info)
        .block(Block::default().title(team.name.clone()).borders(Borders::ALL));
    frame.render_widget(info, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    // Refreshed by apply_delta whenever the squad is replaced.
    let pitch = pitch_text(page.lineup.cached());
    let pitch = Paragraph::new(pitch)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Pitch").borders(Borders::ALL));
    frame.render_widget(pitch, columns[0]);

    render_squad(frame, columns[1], page);
}

/// Attack at the top, goalkeeper at the bottom, bench underneath.
fn pitch_text(lineup: &Lineup) -> Text<'static> {
    let mut lines = Vec::new();
    for pos in Position::PITCH_ORDER.iter().rev() {
        let players = lineup.line(*pos);
        let content = if players.is_empty() {
            Span::styled(format!("No {pos}"), Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(
                players
                    .iter()
                    .map(|p| format!("#{} {}", p.number, p.name))
                    .collect::<Vec<_>>()
                    .join("  "),
            )
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<4}", pos.code()), Style::default().fg(Color::Green)),
            content,
        ]));
        lines.push(Line::from(""));
    }
    let unplaced = lineup.unplaced();
    if !unplaced.is_empty() {
        let names = unplaced
            .iter()
            .map(|p| format!("#{} {}", p.number, p.name))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(format!("??  {names}")));
        lines.push(Line::from(""));
    }
    let bench = if lineup.bench.is_empty() {
        "empty".to_string()
    } else {
        lineup
            .bench
            .iter()
            .map(|p| format!("#{} {} ({})", p.number, p.name, p.position))
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(Line::from(vec![
        Span::styled("Bench: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(bench),
    ]));
    Text::from(lines)
}

fn render_squad(frame: &mut Frame, area: Rect, page: &ClubPage) {
    if page.squad.is_empty() {
        empty(frame, area, "Squad", "No players yet. Press n to add one.");
        return;
    }
    let visible = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_range(page.selected, page.squad.len(), visible);
    let lines: Vec<Line> = page.squad.items()[start..end]
        .iter()
        .enumerate()
        .map(|(offset, p)| {
            Line::styled(
                format!("#{:>2} {:<22} {}", p.number, p.name, p.position),
                selected_style(start + offset == page.selected),
            )
        })
        .collect();
    let squad = Paragraph::new(lines).block(Block::default().title("Squad").borders(Borders::ALL));
    frame.render_widget(squad, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn field_lines<D: FormFields>(draft: &D, shown: impl Fn(usize) -> String) -> Vec<Line<'static>> {
    D::LABELS
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let focused = draft.focus() == idx;
            let marker = if focused { "> " } else { "  " };
            let style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::styled(format!("{marker}{label:<16} {}", shown(idx)), style)
        })
        .collect()
}

fn render_form(frame: &mut Frame, area: Rect, page: &Page) {
    let (title, mut lines, submitting, busy, hint) = match page {
        Page::Clubs(p) => {
            let Some(d) = p.create.draft() else {
                return;
            };
            (
                "Add New Club",
                field_lines(d, |idx| d.value(idx)),
                p.create.is_submitting(),
                "Creating...",
                "Enter Create Club | Tab Next | Esc Cancel",
            )
        }
        Page::Fixtures(p) => {
            let Some(d) = p.schedule.draft() else {
                return;
            };
            let team = |id: Option<u32>| match id {
                Some(id) => p.team_name(id).unwrap_or("TBD").to_string(),
                None => "Select Team".to_string(),
            };
            (
                "New Fixture",
                field_lines(d, |idx| match idx {
                    FixtureDraft::HOME => format!("< {} >", team(d.home_team_id)),
                    FixtureDraft::AWAY => format!("< {} >", team(d.away_team_id)),
                    _ => {
                        let value = d.value(idx);
                        if value.is_empty() {
                            "YYYY-MM-DD HH:MM".to_string()
                        } else {
                            value
                        }
                    }
                }),
                p.schedule.is_submitting(),
                "Scheduling...",
                "Enter Schedule | Tab Next | ←/→ Team | Esc Cancel",
            )
        }
        Page::Club(p) => {
            let Some(d) = p.add.draft() else {
                return;
            };
            (
                "Add Player",
                field_lines(d, |idx| d.value(idx)),
                p.add.is_submitting(),
                "Adding...",
                "Enter Add Player | Tab Next | ←/→ Position | Esc Cancel",
            )
        }
        Page::Home(_) => return,
    };
    lines.push(Line::from(""));
    if submitting {
        lines.push(Line::styled(busy, Style::default().fg(Color::Yellow)));
    } else {
        lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));
    }

    let popup_area = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup_area);
    let form = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(form, popup_area);
}

fn render_confirm(frame: &mut Frame, area: Rect, page: &Page) {
    let (title, flow) = match page {
        Page::Clubs(p) => ("Delete Club?", &p.delete),
        Page::Club(p) => ("Release Player?", &p.release),
        _ => return,
    };
    let Some(target) = flow.draft() else {
        return;
    };
    let footer = if flow.is_submitting() {
        "Working...".to_string()
    } else {
        "y Confirm | n Cancel".to_string()
    };
    let text = format!(
        "{}\n\nThis cannot be undone.\n\n{footer}",
        target.name
    );
    let popup_area = centered_rect(40, 30, area);
    frame.render_widget(Clear, popup_area);
    let confirm = Paragraph::new(text).style(Style::default().fg(Color::Red)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(confirm, popup_area);
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Success => Style::default().fg(Color::Green),
        Tone::Danger => Style::default().fg(Color::Red),
    }
}

fn render_modal(frame: &mut Frame, area: Rect, notice: &Notice) {
    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);
    let text = format!("{}\n\nEnter OK", notice.message);
    let modal = Paragraph::new(text).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(notice.title.clone())
            .borders(Borders::ALL)
            .border_style(tone_style(notice.tone)),
    );
    frame.render_widget(modal, popup_area);
}

fn render_toast(frame: &mut Frame, area: Rect, notice: &Notice) {
    let width = (notice.message.chars().count() as u16 + 4).min(area.width);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width),
        y: area.y,
        width,
        height: area.height.min(3),
    };
    frame.render_widget(Clear, toast_area);
    let toast = Paragraph::new(notice.message.clone())
        .style(tone_style(notice.tone))
        .block(
            Block::default()
                .title(notice.title.clone())
                .borders(Borders::ALL)
                .border_style(tone_style(notice.tone)),
        );
    frame.render_widget(toast, toast_area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Matchday Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Home / Clubs / Fixtures",
        "  b / Esc      Back",
        "  r            Reload page",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Lists:",
        "  j/k or ↑/↓   Move",
        "  Enter        Open club",
        "  n            New club / fixture / player",
        "  x            Delete club / release player",
        "  e            Edit score (live fixtures)",
        "",
        "Forms:",
        "  Tab / ↑/↓    Next / previous field",
        "  ←/→          Change team or position",
        "  Enter        Submit",
        "  Esc          Cancel",
        "",
        "While saving:",
        "  1/2/3, b/Esc Leave the page (reply is ignored)",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use matchday_terminal::api::parse_list_json;
    use matchday_terminal::model::Team;
    use matchday_terminal::state::Delta;

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_keys(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn app_on_clubs(teams: Vec<Team>) -> (App, mpsc::Receiver<ProviderCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let mut app = App::new(&Settings::default(), Some(cmd_tx));
        app.go(Screen::Clubs);
        let page = app.state.token;
        apply_delta(&mut app.state, Delta::ClubsLoaded { page, teams });
        let _ = cmd_rx.try_recv();
        (app, cmd_rx)
    }

    #[test]
    fn hung_club_creation_does_not_lock_navigation() {
        let (mut app, cmd_rx) = app_on_clubs(Vec::new());
        press(&mut app, KeyCode::Char('n'));
        type_keys(&mut app, "Arsenal");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_keys(&mut app, "Arteta");
        press(&mut app, KeyCode::Enter);

        let submitted = cmd_rx.try_recv().expect("create command sent");
        let ProviderCommand::CreateClub { page, .. } = submitted else {
            panic!("expected CreateClub, got {submitted:?}");
        };
        assert_eq!(app.state.overlay(), Overlay::Form);
        assert!(app.state.is_submitting());

        // Typing into the locked draft goes nowhere.
        type_keys(&mut app, "xyz");
        assert_eq!(app.state.screen, Screen::Clubs);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.state.screen, Screen::Home);
        assert_eq!(app.state.overlay(), Overlay::None);
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(ProviderCommand::LoadHome { .. })
        ));

        let team: Vec<Team> =
            parse_list_json(r#"[{"id":10,"name":"Arsenal","coach":"Arteta"}]"#).unwrap();
        apply_delta(
            &mut app.state,
            Delta::ClubCreated {
                page,
                result: Ok(team[0].clone()),
            },
        );
        assert_eq!(app.state.screen, Screen::Home);
        assert!(app.state.notice.is_none());

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn pending_delete_can_be_left_with_back() {
        let teams = parse_list_json(r#"[{"id":10,"name":"Arsenal","coach":"Arteta"}]"#).unwrap();
        let (mut app, cmd_rx) = app_on_clubs(teams);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(ProviderCommand::DeleteClub { team_id: 10, .. })
        ));
        assert_eq!(app.state.overlay(), Overlay::Confirm);

        // A second confirm while the first is out sends nothing.
        press(&mut app, KeyCode::Char('y'));
        assert!(cmd_rx.try_recv().is_err());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.screen, Screen::Home);
        assert!(!app.should_quit);
    }

    #[test]
    fn editing_keys_still_reach_an_open_form() {
        let (mut app, _cmd_rx) = app_on_clubs(Vec::new());
        press(&mut app, KeyCode::Char('n'));
        type_keys(&mut app, "q1b");
        assert!(!app.should_quit);
        assert_eq!(app.state.screen, Screen::Clubs);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.overlay(), Overlay::None);
    }
}
