mod config;
mod recorder;
mod spools;
mod usage;

use std::sync::Arc;

use parking_lot::RwLock;

use crate::app::AppConfig;
use crate::error::Result;
use spool_db::Db;
use spoolman_client::Client;

pub use config::{ConfigService, DEFAULT_FLOW_COMPENSATION_G, DEFAULT_SPOOLMAN_URL, Settings};
pub use recorder::{RecorderService, UsageOutcome};
pub use spools::{RemainingSpool, SpoolsService};
pub use usage::UsageService;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub config: ConfigService,
    pub recorder: RecorderService,
    pub spools: SpoolsService,
    pub usage: UsageService,
}

/// Context shared by all services: immutable paths, one reqwest client, and
/// the mutable settings mirror (written through to the DB on every change).
struct SharedCtx {
    config: AppConfig,
    http: reqwest::Client,
    settings: RwLock<Settings>,
}

type Shared = Arc<SharedCtx>;

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(SharedCtx {
            config: config.clone(),
            http: reqwest::Client::new(),
            settings: RwLock::new(Settings::default()),
        });
        Self {
            config: ConfigService::new(shared.clone()),
            recorder: RecorderService::new(shared.clone()),
            spools: SpoolsService::new(shared.clone()),
            usage: UsageService::new(shared),
        }
    }
}

fn open_db(ctx: &Shared) -> Result<Db> {
    Ok(Db::open(&ctx.config.db_path)?)
}

/// Upstream client for the currently configured base URL. Built per call so
/// every request observes the latest settings snapshot.
fn upstream(ctx: &Shared) -> Client {
    let base = ctx.settings.read().spoolman_url.clone();
    Client::new(ctx.http.clone(), &base)
}
