use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use engine::kv::resolve_store_path;

use crate::controller::ControllerConfig;

pub const DEFAULT_API_ADDR: &str = "127.0.0.1:4000";

/// Runtime settings for the quiz server, read from `CITYQUIZ_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    pub api_addr: SocketAddr,
    pub store_path: PathBuf,
    pub cities_path: Option<PathBuf>,
    pub controller: ControllerConfig,
    pub seed: Option<u64>,
}

impl QuizConfig {
    pub fn from_env() -> Self {
        Self::resolve(|k| std::env::var(k).ok())
    }

    /// Invalid values fall back to defaults rather than failing startup.
    pub fn resolve<F>(mut get_env: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = ControllerConfig::default();
        let millis = |raw: Option<String>, fallback: Duration| {
            raw.and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        let controller = ControllerConfig {
            auto_advance: millis(get_env("CITYQUIZ_AUTO_ADVANCE_MS"), defaults.auto_advance),
            tap_debounce: millis(get_env("CITYQUIZ_TAP_DEBOUNCE_MS"), defaults.tap_debounce),
            choice_count: get_env("CITYQUIZ_CHOICE_COUNT")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n >= 1)
                .unwrap_or(defaults.choice_count),
        };

        Self {
            api_addr: resolve_api_addr(&mut get_env),
            store_path: resolve_store_path(|k| get_env(k).map(PathBuf::from)),
            cities_path: get_env("CITYQUIZ_CITIES_PATH").map(PathBuf::from),
            controller,
            seed: get_env("CITYQUIZ_SEED").and_then(|v| v.trim().parse().ok()),
        }
    }
}

fn resolve_api_addr<F>(get_env: &mut F) -> SocketAddr
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(addr) = get_env("CITYQUIZ_API_ADDR").and_then(|v| v.parse().ok()) {
        return addr;
    }

    if let Some(port) = get_env("CITYQUIZ_API_PORT").and_then(|v| v.parse::<u16>().ok()) {
        return SocketAddr::from(([127, 0, 0, 1], port));
    }

    DEFAULT_API_ADDR
        .parse()
        .expect("default api listen addr should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        let config = QuizConfig::resolve(|_| None);
        assert_eq!(config.api_addr, DEFAULT_API_ADDR.parse().unwrap());
        assert_eq!(config.controller, ControllerConfig::default());
        assert_eq!(config.cities_path, None);
        assert_eq!(config.seed, None);
        assert_eq!(config.store_path, PathBuf::from("./cityquiz/store.json"));
    }

    #[test]
    fn api_addr_prefers_explicit_addr() {
        let config = QuizConfig::resolve(|k| match k {
            "CITYQUIZ_API_ADDR" => Some("0.0.0.0:8080".to_string()),
            "CITYQUIZ_API_PORT" => Some("9000".to_string()),
            _ => None,
        });
        assert_eq!(config.api_addr, "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn invalid_addr_falls_back_to_port() {
        let config = QuizConfig::resolve(|k| match k {
            "CITYQUIZ_API_ADDR" => Some("not-an-addr".to_string()),
            "CITYQUIZ_API_PORT" => Some("4557".to_string()),
            _ => None,
        });
        assert_eq!(config.api_addr, SocketAddr::from(([127, 0, 0, 1], 4557)));
    }

    #[test]
    fn timing_and_choices_are_configurable() {
        let config = QuizConfig::resolve(|k| match k {
            "CITYQUIZ_AUTO_ADVANCE_MS" => Some("1500".to_string()),
            "CITYQUIZ_TAP_DEBOUNCE_MS" => Some("bogus".to_string()),
            "CITYQUIZ_CHOICE_COUNT" => Some("6".to_string()),
            "CITYQUIZ_SEED" => Some("42".to_string()),
            "CITYQUIZ_STORE_PATH" => Some("/tmp/q.json".to_string()),
            _ => None,
        });
        assert_eq!(config.controller.auto_advance, Duration::from_millis(1500));
        assert_eq!(config.controller.tap_debounce, Duration::from_millis(300));
        assert_eq!(config.controller.choice_count, 6);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.store_path, PathBuf::from("/tmp/q.json"));
    }

    #[test]
    fn zero_choice_count_is_rejected() {
        let config = QuizConfig::resolve(|k| match k {
            "CITYQUIZ_CHOICE_COUNT" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config.controller.choice_count, 4);
    }
}
