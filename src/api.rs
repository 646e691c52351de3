use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Method, StatusCode};
use reqwest::blocking::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::http_client::http_client;
use crate::model::{Match, NewMatch, NewPlayer, NewTeam, Player, ScoreUpdate, Standing, Team};

/// The remote league API: list, create, partial-update and delete over
/// `standings` (read-only), `matches`, `teams` and `players`.
///
/// Every call is one round trip. Nothing is retried, batched or deduplicated,
/// and failures are passed through untouched.
pub trait LeagueApi: Send + Sync {
    fn standings(&self) -> Result<Vec<Standing>>;
    fn matches(&self) -> Result<Vec<Match>>;
    fn create_match(&self, payload: &NewMatch) -> Result<Match>;
    fn update_score(&self, match_id: u32, payload: &ScoreUpdate) -> Result<Match>;
    fn teams(&self) -> Result<Vec<Team>>;
    /// `Ok(None)` when the API answers with an empty or `null` body.
    fn team(&self, team_id: u32) -> Result<Option<Team>>;
    fn create_team(&self, payload: &NewTeam) -> Result<Team>;
    fn delete_team(&self, team_id: u32) -> Result<()>;
    fn create_player(&self, payload: &NewPlayer) -> Result<Player>;
    fn delete_player(&self, player_id: u32) -> Result<()>;
}

pub struct ApiClient {
    base_url: String,
    client: &'static Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<String> {
        let label = format!("{method} {path}");
        let mut req = self.client.request(method, self.url(path));
        if let Some(body) = body {
            req = req.body(body);
        }
        let resp = req.send().with_context(|| format!("{label} failed"))?;
        let status = resp.status();
        let text = resp
            .text()
            .with_context(|| format!("{label}: failed reading body"))?;
        checked_body(&label, status, text)
    }

    fn get_text(&self, path: &str) -> Result<String> {
        self.send(Method::GET, path, None)
    }

    fn send_json<B: Serialize>(&self, method: Method, path: &str, payload: &B) -> Result<String> {
        let body = serde_json::to_string(payload)
            .with_context(|| format!("{method} {path}: failed encoding body"))?;
        self.send(method, path, Some(body))
    }
}

impl LeagueApi for ApiClient {
    fn standings(&self) -> Result<Vec<Standing>> {
        parse_list_json(&self.get_text("/standings")?).context("invalid standings json")
    }

    fn matches(&self) -> Result<Vec<Match>> {
        parse_list_json(&self.get_text("/matches")?).context("invalid matches json")
    }

    fn create_match(&self, payload: &NewMatch) -> Result<Match> {
        let raw = self.send_json(Method::POST, "/matches", payload)?;
        parse_record_json(&raw).context("invalid created match json")
    }

    fn update_score(&self, match_id: u32, payload: &ScoreUpdate) -> Result<Match> {
        let raw = self.send_json(Method::PATCH, &format!("/matches/{match_id}"), payload)?;
        parse_record_json(&raw).context("invalid updated match json")
    }

    fn teams(&self) -> Result<Vec<Team>> {
        parse_list_json(&self.get_text("/teams")?).context("invalid teams json")
    }

    fn team(&self, team_id: u32) -> Result<Option<Team>> {
        parse_optional_json(&self.get_text(&format!("/teams/{team_id}"))?)
            .context("invalid team json")
    }

    fn create_team(&self, payload: &NewTeam) -> Result<Team> {
        let raw = self.send_json(Method::POST, "/teams", payload)?;
        parse_record_json(&raw).context("invalid created team json")
    }

    fn delete_team(&self, team_id: u32) -> Result<()> {
        self.send(Method::DELETE, &format!("/teams/{team_id}"), None)
            .map(|_| ())
    }

    fn create_player(&self, payload: &NewPlayer) -> Result<Player> {
        let raw = self.send_json(Method::POST, "/players", payload)?;
        parse_record_json(&raw).context("invalid created player json")
    }

    fn delete_player(&self, player_id: u32) -> Result<()> {
        self.send(Method::DELETE, &format!("/players/{player_id}"), None)
            .map(|_| ())
    }
}

/// Any 2xx passes its body through, empty ones included (DELETE answers
/// 204). Everything else becomes an error carrying the server's text.
fn checked_body(label: &str, status: StatusCode, text: String) -> Result<String> {
    if !status.is_success() {
        return Err(anyhow!("{label}: http {status}: {text}"));
    }
    Ok(text)
}

/// Collection bodies; empty or `null` reads as an empty list.
pub fn parse_list_json<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

pub fn parse_optional_json<T: DeserializeOwned>(raw: &str) -> Result<Option<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

/// A created/updated record must come back; an empty body is an error.
pub fn parse_record_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    parse_optional_json(raw)?.ok_or_else(|| anyhow!("empty response body"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_pass_the_body_through() {
        let body = checked_body("GET /teams", StatusCode::OK, "[]".to_string()).unwrap();
        assert_eq!(body, "[]");
        let empty =
            checked_body("DELETE /teams/7", StatusCode::NO_CONTENT, String::new()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn error_statuses_keep_label_and_server_text() {
        let err = checked_body(
            "GET /teams/99",
            StatusCode::NOT_FOUND,
            "Team not found".to_string(),
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("GET /teams/99"), "{msg}");
        assert!(msg.contains("404"), "{msg}");
        assert!(msg.contains("Team not found"), "{msg}");

        let err = checked_body(
            "POST /matches",
            StatusCode::INTERNAL_SERVER_ERROR,
            String::new(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("500"));
    }

    #[test]
    fn paths_join_onto_base_without_doubled_slashes() {
        let api = ApiClient::new("http://localhost:3000/api/", None).unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000/api");
        assert_eq!(api.url("/teams/7"), "http://localhost:3000/api/teams/7");
        assert_eq!(api.url("/standings"), "http://localhost:3000/api/standings");
    }
}
