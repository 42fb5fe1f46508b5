//! # Column Residency and SLA Percentiles
//!
//! Reconstructs, per request, how long it sat in each column, by
//! replaying moves chronologically from creation. Samples are clipped to
//! the reporting window; a segment still open at the window end
//! contributes only the portion inside the window and is marked censored.
//!
//! Percentiles use nearest-rank selection on the ascending-sorted sample
//! array: `index = floor(p * (n - 1))`, clamped to the array. Every
//! reported percentile is therefore an actual observed duration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use adote_core::Timestamp;
use adote_workflow::{AdoptionRequest, Column, EventKind};

use crate::window::ReportWindow;

/// Seconds in a day, for target configuration.
pub const DAY_SECS: i64 = 86_400;

/// Per-column target durations, in seconds.
///
/// Deserializable so deployments can ship their own targets. Columns
/// without a target still produce percentiles when sampled through a
/// custom table; the breach fraction is only computed against a target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlaTargets {
    targets: BTreeMap<Column, i64>,
}

impl SlaTargets {
    pub fn new(targets: BTreeMap<Column, i64>) -> Self {
        Self { targets }
    }

    /// The program's standard targets.
    pub fn default_program() -> Self {
        Self::new(BTreeMap::from([
            (Column::Protocol, 5 * DAY_SECS),
            (Column::SemadReview, 10 * DAY_SECS),
            (Column::EcosReview, 10 * DAY_SECS),
            (Column::Adjustments, 15 * DAY_SECS),
            (Column::Decision, 7 * DAY_SECS),
        ]))
    }

    /// Target duration for a column, if configured.
    pub fn target_for(&self, column: Column) -> Option<i64> {
        self.targets.get(&column).copied()
    }

    /// The configured columns, in stable order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.targets.keys().copied()
    }
}

/// One stay of a request in one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidencySegment {
    /// The column occupied.
    pub column: Column,
    /// When the request entered it.
    pub entered_at: Timestamp,
    /// When the request left it; `None` while still there.
    pub left_at: Option<Timestamp>,
}

/// Replay a request's history into its ordered residency segments.
///
/// The first segment starts at the `create` event. Moves close the
/// current segment and open the next; an adjustments-request record also
/// acts as a boundary when the legacy history lost the move itself.
/// Overrides and decision records never move the request.
pub fn residency_segments(request: &AdoptionRequest) -> Vec<ResidencySegment> {
    let mut segments = Vec::new();
    let mut current: Option<(Column, Timestamp)> = None;

    for event in request.history() {
        match &event.kind {
            EventKind::Create => {
                if current.is_none() {
                    current = Some((Column::Protocol, event.at));
                }
            }
            EventKind::Move { to, .. } => {
                if let Some((column, entered_at)) = current.take() {
                    segments.push(ResidencySegment {
                        column,
                        entered_at,
                        left_at: Some(event.at),
                    });
                }
                current = Some((*to, event.at));
            }
            EventKind::RequestAdjustments { .. } => {
                if let Some((column, entered_at)) = current {
                    if column != Column::Adjustments {
                        segments.push(ResidencySegment {
                            column,
                            entered_at,
                            left_at: Some(event.at),
                        });
                        current = Some((Column::Adjustments, event.at));
                    }
                }
            }
            EventKind::Override { .. } | EventKind::Decision { .. } => {}
        }
    }

    if let Some((column, entered_at)) = current {
        segments.push(ResidencySegment {
            column,
            entered_at,
            left_at: None,
        });
    }

    segments
}

/// SLA figures for one column over the reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSla {
    /// The column.
    pub column: Column,
    /// Number of duration samples inside the window.
    pub samples: usize,
    /// How many of those samples were right-censored at the window end.
    pub censored: usize,
    /// 50th percentile duration, seconds. Zero when there are no samples.
    pub p50_secs: i64,
    /// 80th percentile duration, seconds.
    pub p80_secs: i64,
    /// 95th percentile duration, seconds.
    pub p95_secs: i64,
    /// Configured target duration, if any.
    pub target_secs: Option<i64>,
    /// Fraction of samples exceeding the target; `None` without a target
    /// or without samples.
    pub breach_fraction: Option<f64>,
}

/// Compute per-column SLA figures for every configured column.
pub fn sla_report(
    requests: &[AdoptionRequest],
    window: &ReportWindow,
    targets: &SlaTargets,
) -> Vec<ColumnSla> {
    let mut samples: BTreeMap<Column, Vec<i64>> = targets.columns().map(|c| (c, Vec::new())).collect();
    let mut censored: BTreeMap<Column, usize> = BTreeMap::new();

    for request in requests {
        for segment in residency_segments(request) {
            let Some(bucket) = samples.get_mut(&segment.column) else {
                continue;
            };

            // Right-censor: without a move before the window end, the
            // segment contributes only up to the window end.
            let (effective_end, is_censored) = match segment.left_at {
                Some(left) if left <= window.end() => (left, false),
                _ => (window.end(), true),
            };

            let clipped_start = segment.entered_at.max(window.start());
            let duration = effective_end.secs_since(clipped_start);
            if duration <= 0 {
                continue;
            }

            bucket.push(duration);
            if is_censored {
                *censored.entry(segment.column).or_default() += 1;
            }
        }
    }

    samples
        .into_iter()
        .map(|(column, mut durations)| {
            durations.sort_unstable();
            let target_secs = targets.target_for(column);
            let breach_fraction = match (target_secs, durations.len()) {
                (Some(target), n) if n > 0 => {
                    let breaches = durations.iter().filter(|d| **d > target).count();
                    Some(breaches as f64 / n as f64)
                }
                _ => None,
            };

            ColumnSla {
                column,
                samples: durations.len(),
                censored: censored.get(&column).copied().unwrap_or(0),
                p50_secs: percentile(&durations, 0.50),
                p80_secs: percentile(&durations, 0.80),
                p95_secs: percentile(&durations, 0.95),
                target_secs,
                breach_fraction,
            }
        })
        .collect()
}

/// Nearest-rank percentile of an ascending-sorted sample array.
///
/// `index = floor(p * (n - 1))`, clamped. Zero for an empty array.
pub fn percentile(sorted: &[i64], p: f64) -> i64 {
    if sorted.is_empty() {
        return 0;
    }
    let index = (p * (sorted.len() - 1) as f64).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use adote_core::{ActorRole, AreaId, ProtocolCode, RequestId};
    use serde_json::{json, Value};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn rebuild(records: &[Value]) -> AdoptionRequest {
        AdoptionRequest::rebuild(
            RequestId::new(),
            ProtocolCode::assign(2026, 1),
            AreaId::new(),
            "Praça Central".to_string(),
            "Jardinagem".to_string(),
            Vec::new(),
            ActorRole::new("citizen").unwrap(),
            ts("2026-03-01T00:00:00Z"),
            records,
        )
    }

    /// 10 days in protocol, then semad review open through the window end.
    fn ten_day_protocol_request() -> AdoptionRequest {
        rebuild(&[
            json!({"type": "create", "at": "2026-03-01T00:00:00Z", "actor": "citizen"}),
            json!({"type": "move", "at": "2026-03-11T00:00:00Z", "actor": "semad",
                   "from": "protocol", "to": "semad_review"}),
        ])
    }

    // ── Segments ─────────────────────────────────────────────────────

    #[test]
    fn test_segments_from_simple_history() {
        let segments = residency_segments(&ten_day_protocol_request());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].column, Column::Protocol);
        assert_eq!(segments[0].left_at, Some(ts("2026-03-11T00:00:00Z")));
        assert_eq!(segments[1].column, Column::SemadReview);
        assert_eq!(segments[1].left_at, None);
    }

    #[test]
    fn test_segments_boundary_from_lone_adjustment_record() {
        // Legacy history that lost the move but kept the companion record.
        let request = rebuild(&[
            json!({"type": "create", "at": "2026-03-01T00:00:00Z", "actor": "citizen"}),
            json!({"type": "request_adjustments", "at": "2026-03-04T00:00:00Z",
                   "actor": "semad", "from": "protocol", "note": "faltam fotos"}),
        ]);
        let segments = residency_segments(&request);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].column, Column::Adjustments);
    }

    // ── Percentiles ──────────────────────────────────────────────────

    #[test]
    fn test_percentile_nearest_rank() {
        let sorted = [10, 20, 30, 40, 50];
        assert_eq!(percentile(&sorted, 0.50), 30);
        assert_eq!(percentile(&sorted, 0.80), 40); // floor(0.8 * 4) = 3
        assert_eq!(percentile(&sorted, 0.95), 40); // floor(0.95 * 4) = 3
        assert_eq!(percentile(&sorted, 1.0), 50);
        assert_eq!(percentile(&sorted, 0.0), 10);
    }

    #[test]
    fn test_percentile_single_sample() {
        assert_eq!(percentile(&[7], 0.50), 7);
        assert_eq!(percentile(&[7], 0.95), 7);
    }

    #[test]
    fn test_percentile_empty() {
        assert_eq!(percentile(&[], 0.50), 0);
    }

    // ── SLA report ───────────────────────────────────────────────────

    #[test]
    fn test_single_segment_all_percentiles_equal() {
        // Window fully contains the 10-day protocol segment and ends
        // exactly when the semad segment has been open 3 days.
        let window =
            ReportWindow::new(ts("2026-03-01T00:00:00Z"), ts("2026-03-14T00:00:00Z")).unwrap();
        let report = sla_report(
            &[ten_day_protocol_request()],
            &window,
            &SlaTargets::default_program(),
        );

        let protocol = report
            .iter()
            .find(|c| c.column == Column::Protocol)
            .unwrap();
        assert_eq!(protocol.samples, 1);
        assert_eq!(protocol.censored, 0);
        assert_eq!(protocol.p50_secs, 10 * DAY_SECS);
        assert_eq!(protocol.p80_secs, 10 * DAY_SECS);
        assert_eq!(protocol.p95_secs, 10 * DAY_SECS);

        let semad = report
            .iter()
            .find(|c| c.column == Column::SemadReview)
            .unwrap();
        assert_eq!(semad.samples, 1);
        assert_eq!(semad.censored, 1);
        assert_eq!(semad.p50_secs, 3 * DAY_SECS);
    }

    #[test]
    fn test_window_ending_mid_segment_censors() {
        // Window ends 5 days into the 10-day protocol stay: the sample is
        // the clipped duration only, and marked censored.
        let window =
            ReportWindow::new(ts("2026-03-01T00:00:00Z"), ts("2026-03-06T00:00:00Z")).unwrap();
        let report = sla_report(
            &[ten_day_protocol_request()],
            &window,
            &SlaTargets::default_program(),
        );

        let protocol = report
            .iter()
            .find(|c| c.column == Column::Protocol)
            .unwrap();
        assert_eq!(protocol.samples, 1);
        assert_eq!(protocol.censored, 1);
        assert_eq!(protocol.p50_secs, 5 * DAY_SECS);
    }

    #[test]
    fn test_window_starting_mid_segment_clips_left() {
        let window =
            ReportWindow::new(ts("2026-03-08T00:00:00Z"), ts("2026-03-20T00:00:00Z")).unwrap();
        let report = sla_report(
            &[ten_day_protocol_request()],
            &window,
            &SlaTargets::default_program(),
        );

        let protocol = report
            .iter()
            .find(|c| c.column == Column::Protocol)
            .unwrap();
        // Only the 3 days between the window start and the move count.
        assert_eq!(protocol.p50_secs, 3 * DAY_SECS);
        assert_eq!(protocol.censored, 0);
    }

    #[test]
    fn test_breach_fraction_against_target() {
        // Protocol target is 5 days; a 10-day stay breaches it.
        let window =
            ReportWindow::new(ts("2026-03-01T00:00:00Z"), ts("2026-03-31T00:00:00Z")).unwrap();
        let report = sla_report(
            &[ten_day_protocol_request()],
            &window,
            &SlaTargets::default_program(),
        );

        let protocol = report
            .iter()
            .find(|c| c.column == Column::Protocol)
            .unwrap();
        assert_eq!(protocol.target_secs, Some(5 * DAY_SECS));
        assert_eq!(protocol.breach_fraction, Some(1.0));
    }

    #[test]
    fn test_segment_outside_window_contributes_nothing() {
        let window =
            ReportWindow::new(ts("2026-05-01T00:00:00Z"), ts("2026-05-31T00:00:00Z")).unwrap();
        let request = rebuild(&[
            json!({"type": "create", "at": "2026-03-01T00:00:00Z", "actor": "citizen"}),
            json!({"type": "move", "at": "2026-03-11T00:00:00Z", "actor": "semad",
                   "from": "protocol", "to": "rejected", "note": "sem condições"}),
        ]);
        let report = sla_report(&[request], &window, &SlaTargets::default_program());
        let protocol = report
            .iter()
            .find(|c| c.column == Column::Protocol)
            .unwrap();
        assert_eq!(protocol.samples, 0);
        assert_eq!(protocol.breach_fraction, None);
    }

    #[test]
    fn test_empty_history_is_harmless() {
        let window =
            ReportWindow::new(ts("2026-03-01T00:00:00Z"), ts("2026-03-31T00:00:00Z")).unwrap();
        let request = rebuild(&[]);
        // The synthetic create opens a protocol segment that runs to the
        // window end: one censored sample, no failures.
        let report = sla_report(&[request], &window, &SlaTargets::default_program());
        let protocol = report
            .iter()
            .find(|c| c.column == Column::Protocol)
            .unwrap();
        assert_eq!(protocol.samples, 1);
        assert_eq!(protocol.censored, 1);
    }

    #[test]
    fn test_multiple_requests_pool_samples() {
        let mk = |days: u32| {
            rebuild(&[
                json!({"type": "create", "at": "2026-03-01T00:00:00Z", "actor": "citizen"}),
                json!({"type": "move",
                       "at": format!("2026-03-{:02}T00:00:00Z", 1 + days),
                       "actor": "semad", "from": "protocol", "to": "semad_review"}),
            ])
        };
        let requests = vec![mk(2), mk(4), mk(6)];
        let window =
            ReportWindow::new(ts("2026-03-01T00:00:00Z"), ts("2026-03-31T00:00:00Z")).unwrap();
        let report = sla_report(&requests, &window, &SlaTargets::default_program());

        let protocol = report
            .iter()
            .find(|c| c.column == Column::Protocol)
            .unwrap();
        assert_eq!(protocol.samples, 3);
        assert_eq!(protocol.p50_secs, 4 * DAY_SECS); // floor(0.50 * 2) = 1
        assert_eq!(protocol.p95_secs, 4 * DAY_SECS); // floor(0.95 * 2) = 1
    }

    #[test]
    fn test_targets_deserialize_from_config() {
        let json = r#"{"targets": {"protocol": 259200, "decision": 432000}}"#;
        let targets: SlaTargets = serde_json::from_str(json).unwrap();
        assert_eq!(targets.target_for(Column::Protocol), Some(3 * DAY_SECS));
        assert_eq!(targets.target_for(Column::SemadReview), None);
    }

    // ── Percentile properties ────────────────────────────────────────

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn percentiles_are_observed_samples(
                mut samples in proptest::collection::vec(0i64..1_000_000, 1..50)
            ) {
                samples.sort_unstable();
                for p in [0.50, 0.80, 0.95] {
                    prop_assert!(samples.contains(&percentile(&samples, p)));
                }
            }

            #[test]
            fn percentiles_are_monotone(
                mut samples in proptest::collection::vec(0i64..1_000_000, 1..50)
            ) {
                samples.sort_unstable();
                let p50 = percentile(&samples, 0.50);
                let p80 = percentile(&samples, 0.80);
                let p95 = percentile(&samples, 0.95);
                prop_assert!(p50 <= p80);
                prop_assert!(p80 <= p95);
            }
        }
    }
}
