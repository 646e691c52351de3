use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://premiere-league-api.vercel.app/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    /// `None` leaves requests without a deadline.
    pub request_timeout: Option<Duration>,
    pub loading_delay: Duration,
    pub toast_ttl: Duration,
    pub tick_rate: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            loading_delay: Duration::from_millis(500),
            toast_ttl: Duration::from_millis(3000),
            tick_rate: Duration::from_millis(250),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("FOOTBALL_API_URL")
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.api_url);
        let request_timeout = parse_u64(&lookup, "FOOTBALL_API_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let loading_delay = parse_u64(&lookup, "LOADING_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.loading_delay);
        let toast_ttl = parse_u64(&lookup, "TOAST_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.toast_ttl);
        let tick_rate = Duration::from_millis(
            parse_u64(&lookup, "TICK_MS")
                .unwrap_or(defaults.tick_rate.as_millis() as u64)
                .max(50),
        );

        Self {
            api_url,
            request_timeout,
            loading_delay,
            toast_ttl,
            tick_rate,
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    lookup(key).and_then(|val| val.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(settings_from(&[]), Settings::default());
    }

    #[test]
    fn api_url_trailing_slash_is_trimmed() {
        let s = settings_from(&[("FOOTBALL_API_URL", "http://localhost:3000/api/")]);
        assert_eq!(s.api_url, "http://localhost:3000/api");
    }

    #[test]
    fn zero_or_garbage_timeout_means_no_deadline() {
        assert_eq!(
            settings_from(&[("FOOTBALL_API_TIMEOUT_SECS", "0")]).request_timeout,
            None
        );
        assert_eq!(
            settings_from(&[("FOOTBALL_API_TIMEOUT_SECS", "soon")]).request_timeout,
            None
        );
        assert_eq!(
            settings_from(&[("FOOTBALL_API_TIMEOUT_SECS", "15")]).request_timeout,
            Some(Duration::from_secs(15))
        );
    }

    #[test]
    fn tick_rate_has_a_floor() {
        let s = settings_from(&[("TICK_MS", "5")]);
        assert_eq!(s.tick_rate, Duration::from_millis(50));
    }
}
