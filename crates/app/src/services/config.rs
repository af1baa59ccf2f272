use crate::error::{AppError, Result};
use crate::services::{Shared, open_db};
use spoolman_client::strip_api_suffix;

pub const DEFAULT_SPOOLMAN_URL: &str = "http://localhost:7912";
pub const DEFAULT_FLOW_COMPENSATION_G: f64 = 1.5;

/// In-memory mirror of the persisted settings. Loaded once at startup and
/// kept in sync with every successful config write.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Bare Spoolman base URL, versioned suffix stripped.
    pub spoolman_url: String,
    /// Grams added per filament by the dashboard to compensate flow variance.
    pub flow_compensation_g: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spoolman_url: DEFAULT_SPOOLMAN_URL.to_string(),
            flow_compensation_g: DEFAULT_FLOW_COMPENSATION_G,
        }
    }
}

#[derive(Clone)]
pub struct ConfigService {
    ctx: Shared,
}

impl ConfigService {
    pub(super) fn new(ctx: Shared) -> Self {
        Self { ctx }
    }

    pub fn snapshot(&self) -> Settings {
        self.ctx.settings.read().clone()
    }

    /// Read persisted settings into the mirror; missing rows keep defaults.
    pub fn load(&self) -> Result<()> {
        let db = open_db(&self.ctx)?;
        let mut settings = Settings::default();
        if let Some(url) = db.get_spoolman_url()? {
            settings.spoolman_url = url;
        }
        if let Some(grams) = db.get_flow_compensation()? {
            settings.flow_compensation_g = grams;
        }
        *self.ctx.settings.write() = settings;
        Ok(())
    }

    /// Partial settings update. Validation happens before any write; the DB
    /// row is written first, then the mirror, so a storage failure leaves
    /// the mirror on the old value.
    pub fn update(
        &self,
        spoolman_url: Option<&str>,
        flow_compensation_g: Option<f64>,
    ) -> Result<Settings> {
        let cleaned_url = match spoolman_url {
            Some(url) => {
                if url.trim().is_empty() {
                    return Err(AppError::InvalidInput(
                        "spoolmanUrl is required and must be a non-empty string".to_string(),
                    ));
                }
                Some(strip_api_suffix(url))
            }
            None => None,
        };
        if let Some(grams) = flow_compensation_g
            && !grams.is_finite()
        {
            return Err(AppError::InvalidInput(
                "flowCompensationValue must be a finite number".to_string(),
            ));
        }

        let db = open_db(&self.ctx)?;
        if let Some(url) = &cleaned_url {
            db.set_spoolman_url(url)?;
            self.ctx.settings.write().spoolman_url = url.clone();
        }
        if let Some(grams) = flow_compensation_g {
            db.set_flow_compensation(grams)?;
            self.ctx.settings.write().flow_compensation_g = grams;
        }
        Ok(self.snapshot())
    }
}
