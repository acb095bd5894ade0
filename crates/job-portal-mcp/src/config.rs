use job_portal_storage::IdPolicy;

use crate::error::ServerError;

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMode {
    Demo,
    Empty,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: Transport,
    pub http_addr: String,
    pub seed: SeedMode,
    pub id_policy: IdPolicy,
    pub completion_limit: usize,
    pub match_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            seed: SeedMode::Demo,
            id_policy: IdPolicy::MaxPlusOne,
            completion_limit: 100,
            match_limit: 3,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let transport = match read("JOB_PORTAL_TRANSPORT").map(|v| v.to_ascii_lowercase()) {
            None => defaults.transport,
            Some(v) if v == "stdio" => Transport::Stdio,
            Some(v) if v == "http" => Transport::Http,
            Some(_) => {
                return Err(ServerError::Config(
                    "JOB_PORTAL_TRANSPORT must be stdio or http".to_string(),
                ));
            }
        };
        let seed = match read("JOB_PORTAL_SEED").map(|v| v.to_ascii_lowercase()) {
            None => defaults.seed,
            Some(v) if matches!(v.as_str(), "demo" | "sample") => SeedMode::Demo,
            Some(v) if matches!(v.as_str(), "empty" | "none") => SeedMode::Empty,
            Some(_) => {
                return Err(ServerError::Config(
                    "JOB_PORTAL_SEED must be demo or empty".to_string(),
                ));
            }
        };
        let id_policy = match read("JOB_PORTAL_ID_POLICY") {
            None => defaults.id_policy,
            Some(v) => v
                .parse::<IdPolicy>()
                .map_err(|e| ServerError::Config(e.to_string()))?,
        };

        Ok(Self {
            transport,
            http_addr: read("JOB_PORTAL_HTTP_ADDR").unwrap_or(defaults.http_addr),
            seed,
            id_policy,
            completion_limit: bounded_usize(
                read("JOB_PORTAL_COMPLETION_LIMIT"),
                defaults.completion_limit,
                1,
                1000,
            ),
            match_limit: bounded_usize(read("JOB_PORTAL_MATCH_LIMIT"), defaults.match_limit, 1, 50),
        })
    }
}

fn bounded_usize(raw: Option<String>, default: usize, min: usize, max: usize) -> usize {
    raw.and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}
