use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context};
use propdesk_core::search::SearchIndexes;

/// Where records are stored and searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// In-process document store and index, optionally seeded from a file.
    Memory,
    /// Firestore documents searched through Algolia.
    Firestore,
}

#[derive(Debug, Clone, Default)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub database: String,
    pub access_token: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AlgoliaSettings {
    pub app_id: String,
    pub api_key: String,
    pub base_url: Option<String>,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub backend: Backend,
    pub firestore: Option<FirestoreSettings>,
    pub algolia: Option<AlgoliaSettings>,
    pub indexes: SearchIndexes,
    pub seed_file: Option<PathBuf>,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `PD_*` variables supplied by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let listen_addr: SocketAddr = var("PD_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid PD_LISTEN_ADDR")?;

        let backend = match var("PD_BACKEND").as_deref().unwrap_or("memory") {
            b if b.eq_ignore_ascii_case("memory") => Backend::Memory,
            b if b.eq_ignore_ascii_case("firestore") => Backend::Firestore,
            other => bail!("Unknown PD_BACKEND '{}'", other),
        };

        let firestore = var("PD_FIRESTORE_PROJECT").map(|project_id| FirestoreSettings {
            project_id,
            database: var("PD_FIRESTORE_DATABASE").unwrap_or_else(|| "(default)".to_string()),
            access_token: var("PD_FIRESTORE_TOKEN"),
            api_key: var("PD_FIRESTORE_API_KEY"),
            base_url: var("PD_FIRESTORE_BASE_URL"),
        });

        let algolia = match (var("PD_ALGOLIA_APP_ID"), var("PD_ALGOLIA_API_KEY")) {
            (Some(app_id), Some(api_key)) => Some(AlgoliaSettings {
                app_id,
                api_key,
                base_url: var("PD_ALGOLIA_BASE_URL"),
            }),
            (None, None) => None,
            _ => bail!("PD_ALGOLIA_APP_ID and PD_ALGOLIA_API_KEY must be set together"),
        };

        if backend == Backend::Firestore {
            if firestore.is_none() {
                return Err(anyhow!("PD_BACKEND=firestore requires PD_FIRESTORE_PROJECT"));
            }
            if algolia.is_none() {
                return Err(anyhow!("PD_BACKEND=firestore requires Algolia credentials"));
            }
        }

        let defaults = SearchIndexes::default();
        let indexes = SearchIndexes {
            properties: var("PD_INDEX_PROPERTIES").unwrap_or(defaults.properties),
            requirements: var("PD_INDEX_REQUIREMENTS").unwrap_or(defaults.requirements),
            pre_launch_projects: var("PD_INDEX_PRE_LAUNCH_PROJECTS")
                .unwrap_or(defaults.pre_launch_projects),
            post_rera_projects: var("PD_INDEX_POST_RERA_PROJECTS")
                .unwrap_or(defaults.post_rera_projects),
        };

        let cors_allow = var("PD_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = var("PD_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30000);

        Ok(Self {
            listen_addr,
            backend,
            firestore,
            algolia,
            indexes,
            seed_file: var("PD_SEED_FILE").map(PathBuf::from),
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
