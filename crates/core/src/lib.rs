use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filament {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub vendor: Option<Vendor>,
    pub price: Option<f64>,
    /// Net weight of a full spool of this filament, grams.
    pub weight: Option<f64>,
    pub color_hex: Option<String>,
    pub multi_color_hexes: Option<String>,
    pub multi_color_direction: Option<String>,
}

/// Spool record as served by Spoolman. Read-only on this side; the only
/// fields ever written back are `remaining_weight` and `last_used`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spool {
    pub id: i64,
    pub remaining_weight: Option<f64>,
    pub initial_weight: Option<f64>,
    pub archived: Option<bool>,
    pub last_used: Option<String>,
    pub display_name: Option<String>,
    pub filament: Option<Filament>,
}

impl Spool {
    /// Weight of the spool when full, used as the cost denominator. Spoolman
    /// reports it either on the spool or on the filament depending on how the
    /// spool was created.
    pub fn full_weight(&self) -> Option<f64> {
        self.initial_weight
            .or_else(|| self.filament.as_ref().and_then(|filament| filament.weight))
    }

    pub fn filament_name(&self) -> Option<&str> {
        self.filament
            .as_ref()
            .and_then(|filament| filament.name.as_deref())
    }

    pub fn vendor_name(&self) -> Option<&str> {
        self.filament
            .as_ref()
            .and_then(|filament| filament.vendor.as_ref())
            .and_then(|vendor| vendor.name.as_deref())
    }
}

/// Locally logged usage event. Append-only: rows are inserted once and never
/// mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: i64,
    pub spool_id: String,
    pub used_at: String,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Usage record joined with upstream filament metadata at read time.
/// `cost` is `None` (not zero) when the spool weight or price is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedUsage {
    pub id: i64,
    pub spool_id: String,
    pub date: String,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub name: String,
    pub vendor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_color_hexes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_color_direction: Option<String>,
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintJob {
    pub job_key: String,
    pub date: String,
    pub note: String,
    pub entries: Vec<EnrichedUsage>,
    pub total_weight: f64,
    pub total_cost: f64,
}

/// Cost of using `weight` grams from a spool that held `full_weight` grams
/// when new and was bought for `price`. Absent operands yield `None` rather
/// than zero so callers can tell "free" from "unknown".
pub fn usage_cost(weight: f64, full_weight: Option<f64>, price: Option<f64>) -> Option<f64> {
    let full_weight = full_weight?;
    let price = price?;
    if full_weight <= 0.0 {
        return None;
    }
    Some((weight / full_weight) * price)
}

/// Calendar bucket for the grouping key, derived in local time. Records with
/// unparsable timestamps all share one bucket.
fn job_bucket(date: &str) -> String {
    match DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => {
            let local = parsed.with_timezone(&Local);
            format!(
                "{}-{}-{}-{}",
                local.year(),
                local.month(),
                local.day(),
                local.hour()
            )
        }
        Err(_) => "invalid".to_string(),
    }
}

fn sort_millis(date: &str) -> i64 {
    DateTime::parse_from_rfc3339(date)
        .map(|parsed| parsed.timestamp_millis())
        .unwrap_or(0)
}

/// Cluster an enriched usage feed into inferred print jobs.
///
/// The key is (local year-month-day-hour, note); records from the same clock
/// hour with the same note are assumed to belong to one job. This is an
/// approximate heuristic, not a real job identifier, and a note containing
/// the `|` separator is an accepted limitation. Input is expected in
/// descending time order, so the first member of a group is its most recent
/// entry and becomes the group's representative date. Member order follows
/// input order; groups are sorted descending by representative date with
/// ties kept in encounter order.
pub fn group_print_jobs(usage: &[EnrichedUsage]) -> Vec<PrintJob> {
    let mut jobs: Vec<PrintJob> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for entry in usage {
        let note = entry.note.clone().unwrap_or_default();
        let key = format!("{}|{}", job_bucket(&entry.date), note);
        let slot = *slots.entry(key.clone()).or_insert_with(|| {
            jobs.push(PrintJob {
                job_key: key,
                date: entry.date.clone(),
                note,
                entries: Vec::new(),
                total_weight: 0.0,
                total_cost: 0.0,
            });
            jobs.len() - 1
        });
        let job = &mut jobs[slot];
        job.entries.push(entry.clone());
        job.total_weight += entry.weight;
        // Unknown costs count as zero in the sum only.
        job.total_cost += entry.cost.unwrap_or(0.0);
    }
    jobs.sort_by_key(|job| std::cmp::Reverse(sort_millis(&job.date)));
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_usage(id: i64, date: &str, weight: f64, note: Option<&str>) -> EnrichedUsage {
        EnrichedUsage {
            id,
            spool_id: "1".to_string(),
            date: date.to_string(),
            weight,
            note: note.map(str::to_string),
            name: "PLA Black".to_string(),
            vendor: "Prusament".to_string(),
            color_hex: None,
            multi_color_hexes: None,
            multi_color_direction: None,
            cost: None,
        }
    }

    #[test]
    fn usage_cost_scales_price_by_weight_fraction() {
        let cost = usage_cost(250.0, Some(1000.0), Some(20.0)).expect("cost");
        assert!((cost - 5.0).abs() < 1e-9);
    }

    #[test]
    fn usage_cost_is_none_when_operands_missing() {
        assert_eq!(usage_cost(100.0, None, Some(20.0)), None);
        assert_eq!(usage_cost(100.0, Some(1000.0), None), None);
        assert_eq!(usage_cost(100.0, Some(0.0), Some(20.0)), None);
    }

    #[test]
    fn same_hour_same_note_merges_into_one_job() {
        let usage = vec![
            make_usage(2, "2025-03-01T14:45:00Z", 10.0, Some("Job A")),
            make_usage(1, "2025-03-01T14:05:00Z", 5.0, Some("Job A")),
        ];
        let jobs = group_print_jobs(&usage);
        assert_eq!(jobs.len(), 1);
        assert!((jobs[0].total_weight - 15.0).abs() < 1e-9);
        assert_eq!(jobs[0].entries.len(), 2);
        // First member of the descending input is the representative date.
        assert_eq!(jobs[0].date, "2025-03-01T14:45:00Z");
    }

    #[test]
    fn empty_note_never_collides_with_nonempty_note() {
        let usage = vec![
            make_usage(2, "2025-03-01T14:45:00Z", 10.0, Some("x")),
            make_usage(1, "2025-03-01T14:05:00Z", 5.0, None),
        ];
        let jobs = group_print_jobs(&usage);
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn different_hours_split_jobs() {
        let usage = vec![
            make_usage(2, "2025-03-01T15:01:00Z", 10.0, Some("Job A")),
            make_usage(1, "2025-03-01T14:59:00Z", 5.0, Some("Job A")),
        ];
        let jobs = group_print_jobs(&usage);
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn groups_sort_descending_by_representative_date() {
        let usage = vec![
            make_usage(3, "2025-03-02T09:00:00Z", 1.0, None),
            make_usage(2, "2025-03-01T14:45:00Z", 2.0, Some("Job A")),
            make_usage(1, "2025-03-01T13:00:00Z", 3.0, None),
        ];
        let jobs = group_print_jobs(&usage);
        let dates: Vec<&str> = jobs.iter().map(|job| job.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2025-03-02T09:00:00Z",
                "2025-03-01T14:45:00Z",
                "2025-03-01T13:00:00Z"
            ]
        );
    }

    #[test]
    fn unknown_cost_counts_as_zero_in_sum() {
        let mut priced = make_usage(2, "2025-03-01T14:45:00Z", 10.0, Some("Job A"));
        priced.cost = Some(2.5);
        let unpriced = make_usage(1, "2025-03-01T14:05:00Z", 5.0, Some("Job A"));
        let jobs = group_print_jobs(&[priced, unpriced]);
        assert_eq!(jobs.len(), 1);
        assert!((jobs[0].total_cost - 2.5).abs() < 1e-9);
    }

    #[test]
    fn grouping_is_idempotent() {
        let usage = vec![
            make_usage(3, "2025-03-02T09:00:00Z", 1.0, None),
            make_usage(2, "2025-03-01T14:45:00Z", 2.0, Some("Job A")),
            make_usage(1, "2025-03-01T14:05:00Z", 3.0, Some("Job A")),
        ];
        let first = group_print_jobs(&usage);
        let second = group_print_jobs(&usage);
        assert_eq!(first, second);
    }

    #[test]
    fn full_weight_prefers_spool_initial_weight() {
        let spool = Spool {
            id: 1,
            remaining_weight: Some(500.0),
            initial_weight: Some(1000.0),
            archived: None,
            last_used: None,
            display_name: None,
            filament: Some(Filament {
                id: None,
                name: None,
                vendor: None,
                price: None,
                weight: Some(750.0),
                color_hex: None,
                multi_color_hexes: None,
                multi_color_direction: None,
            }),
        };
        assert_eq!(spool.full_weight(), Some(1000.0));
    }
}
