use std::collections::HashMap;

use crate::error::Result;
use crate::services::{Shared, open_db, upstream};
use spool_core::{EnrichedUsage, Spool, UsageRecord, usage_cost};

const UNKNOWN: &str = "Unknown";

#[derive(Clone)]
pub struct UsageService {
    ctx: Shared,
}

impl UsageService {
    pub(super) fn new(ctx: Shared) -> Self {
        Self { ctx }
    }

    /// Full usage history, newest first, decorated with current upstream
    /// spool metadata and per-use cost.
    ///
    /// The upstream fetch covers archived spools so old history still
    /// resolves. When Spoolman cannot be reached the feed degrades to
    /// unenriched rows (name/vendor "Unknown", cost null) instead of
    /// failing; history must stay visible while upstream is down.
    pub async fn list_all(&self) -> Result<Vec<EnrichedUsage>> {
        let db = open_db(&self.ctx)?;
        let records = db.list_all_usage()?;

        let spools: Option<HashMap<i64, Spool>> = match upstream(&self.ctx).list_spools(true).await
        {
            Ok(spools) => Some(
                spools
                    .into_iter()
                    .map(|spool| (spool.id, spool))
                    .collect(),
            ),
            Err(_) => None,
        };

        Ok(records
            .into_iter()
            .map(|record| enrich(record, spools.as_ref()))
            .collect())
    }

    /// Per-spool history: date, weight, optional note. No upstream
    /// dependency, so this path cannot degrade.
    pub fn list_for_spool(&self, spool_id: &str) -> Result<Vec<UsageRecord>> {
        let db = open_db(&self.ctx)?;
        Ok(db.list_usage_for_spool(spool_id.trim())?)
    }
}

fn enrich(record: UsageRecord, spools: Option<&HashMap<i64, Spool>>) -> EnrichedUsage {
    let spool = spools.and_then(|lookup| {
        record
            .spool_id
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|id| lookup.get(&id))
    });

    let (name, vendor, color_hex, multi_color_hexes, multi_color_direction, cost) = match spool {
        Some(spool) => {
            let filament = spool.filament.as_ref();
            (
                spool.filament_name().unwrap_or(UNKNOWN).to_string(),
                spool.vendor_name().unwrap_or(UNKNOWN).to_string(),
                filament.and_then(|filament| filament.color_hex.clone()),
                filament.and_then(|filament| filament.multi_color_hexes.clone()),
                filament.and_then(|filament| filament.multi_color_direction.clone()),
                usage_cost(
                    record.weight,
                    spool.full_weight(),
                    filament.and_then(|filament| filament.price),
                ),
            )
        }
        None => (UNKNOWN.to_string(), UNKNOWN.to_string(), None, None, None, None),
    };

    EnrichedUsage {
        id: record.id,
        spool_id: record.spool_id,
        date: record.used_at,
        weight: record.weight,
        note: record.note,
        name,
        vendor,
        color_hex,
        multi_color_hexes,
        multi_color_direction,
        cost,
    }
}
