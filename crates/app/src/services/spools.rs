use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::services::{Shared, upstream};

/// Condensed remaining-stock view for the dashboard sidebar.
#[derive(Debug, Clone, Serialize)]
pub struct RemainingSpool {
    pub id: i64,
    pub name: String,
    pub remaining_weight: Option<f64>,
}

#[derive(Clone)]
pub struct SpoolsService {
    ctx: Shared,
}

impl SpoolsService {
    pub(super) fn new(ctx: Shared) -> Self {
        Self { ctx }
    }

    /// Upstream connectivity probe; the info payload is passed through.
    pub async fn info(&self) -> Result<Value> {
        Ok(upstream(&self.ctx).info().await?)
    }

    /// Raw Spoolman spool list, passed through untouched.
    pub async fn list(&self) -> Result<Value> {
        Ok(upstream(&self.ctx).spools_payload().await?)
    }

    pub async fn remaining(&self) -> Result<Vec<RemainingSpool>> {
        let spools = upstream(&self.ctx).list_spools(false).await?;
        Ok(spools
            .into_iter()
            .map(|spool| {
                let name = spool
                    .display_name
                    .clone()
                    .or_else(|| spool.filament_name().map(str::to_string))
                    .unwrap_or_else(|| format!("Spool {}", spool.id));
                RemainingSpool {
                    id: spool.id,
                    name,
                    remaining_weight: spool.remaining_weight,
                }
            })
            .collect())
    }
}
