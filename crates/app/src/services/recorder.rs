use chrono::{SecondsFormat, Utc};

use crate::error::{AppError, Result};
use crate::services::{Shared, open_db, upstream};
use spoolman_client::SpoolPatch;

/// Result of one recorded usage event.
#[derive(Debug, Clone, Copy)]
pub struct UsageOutcome {
    /// Row id of the appended usage record.
    pub record_id: i64,
    /// True when the requested weight exceeded what the spool had left, i.e.
    /// the raw new remaining weight was negative before clamping.
    pub was_emptied: bool,
}

#[derive(Clone)]
pub struct RecorderService {
    ctx: Shared,
}

impl RecorderService {
    pub(super) fn new(ctx: Shared) -> Self {
        Self { ctx }
    }

    /// Record one usage event: decrement the spool upstream, then append to
    /// the local log.
    ///
    /// Spoolman is the system of record, so the write order is fixed:
    /// upstream must succeed before the local row is inserted, and an
    /// upstream failure aborts with no local write. The reverse failure
    /// (upstream patched, local insert failed) is surfaced as
    /// [`AppError::PartialWrite`]. The timestamp is captured once and used
    /// for both writes so they never disagree. The remaining weight sent
    /// upstream is clamped at zero; the logged weight is the caller's
    /// original value.
    pub async fn record(
        &self,
        spool_id: &str,
        weight: f64,
        note: Option<&str>,
    ) -> Result<UsageOutcome> {
        let spool_id = spool_id.trim();
        let id: i64 = spool_id.parse().map_err(|_| {
            AppError::InvalidInput(format!("invalid spool id {:?}", spool_id))
        })?;
        if !weight.is_finite() {
            return Err(AppError::InvalidInput(
                "weight must be a finite number".to_string(),
            ));
        }

        let used_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let client = upstream(&self.ctx);
        let spool = client.get_spool(id).await?;

        let remaining = spool.remaining_weight.unwrap_or(0.0);
        let new_remaining = remaining - weight;
        let clamped = new_remaining.max(0.0);
        client
            .patch_spool(
                id,
                &SpoolPatch {
                    remaining_weight: clamped,
                    last_used: used_at.clone(),
                },
            )
            .await?;

        // Past this point upstream is already mutated; storage failures must
        // not masquerade as ordinary errors.
        let db = open_db(&self.ctx).map_err(partial_write)?;
        let record_id = db
            .insert_usage(spool_id, &used_at, weight, note.filter(|note| !note.is_empty()))
            .map_err(AppError::PartialWrite)?;

        Ok(UsageOutcome {
            record_id,
            was_emptied: new_remaining < 0.0,
        })
    }
}

fn partial_write(err: AppError) -> AppError {
    match err {
        AppError::Storage(source) => AppError::PartialWrite(source),
        other => other,
    }
}
