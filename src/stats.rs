use crate::session_log::{FlickingRecord, TrackingRecord};
use crate::util::{mean, std_dev};

/// Chart series length on the stats screen.
pub const RECENT_SERIES_LEN: usize = 10;

/// How far back the aggregate numbers look.
pub const AGGREGATE_WINDOW: usize = 100;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackingSummary {
    pub count: usize,
    pub avg_t0: f64,
    pub best_t0: f64,
    /// Last-N t0 rates, oldest first, for charting.
    pub recent: Vec<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlickingSummary {
    pub count: usize,
    pub avg_accuracy: f64,
    pub best_accuracy: f64,
    /// Mean of per-session average reactions, over sessions that had hits.
    pub avg_reaction_ms: f64,
    /// Spread of those per-session averages; 0 with fewer than two samples.
    pub reaction_spread_ms: f64,
    /// Last-N accuracies, oldest first, for charting.
    pub recent: Vec<f64>,
}

/// Pure reduction over already-loaded history; input records are not
/// touched.
pub fn tracking_summary(records: &[TrackingRecord], recent_n: usize) -> TrackingSummary {
    let rates: Vec<f64> = records.iter().map(|r| r.t0_rate).collect();

    TrackingSummary {
        count: records.len(),
        avg_t0: mean(&rates).unwrap_or(0.0),
        best_t0: rates.iter().copied().fold(0.0, f64::max),
        recent: tail(&rates, recent_n),
    }
}

pub fn flicking_summary(records: &[FlickingRecord], recent_n: usize) -> FlickingSummary {
    let accuracies: Vec<f64> = records.iter().map(|r| r.accuracy).collect();
    let reactions: Vec<f64> = records.iter().filter_map(|r| r.avg_reaction_ms).collect();

    FlickingSummary {
        count: records.len(),
        avg_accuracy: mean(&accuracies).unwrap_or(0.0),
        best_accuracy: accuracies.iter().copied().fold(0.0, f64::max),
        avg_reaction_ms: mean(&reactions).unwrap_or(0.0),
        reaction_spread_ms: std_dev(&reactions).unwrap_or(0.0),
        recent: tail(&accuracies, recent_n),
    }
}

fn tail(values: &[f64], n: usize) -> Vec<f64> {
    values[values.len().saturating_sub(n)..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn tracking(t0: f64) -> TrackingRecord {
        TrackingRecord {
            timestamp: Local::now(),
            t0_rate: t0,
            duration_secs: 30.0,
        }
    }

    fn flicking(accuracy: f64, avg_reaction_ms: Option<f64>) -> FlickingRecord {
        FlickingRecord {
            timestamp: Local::now(),
            accuracy,
            avg_reaction_ms,
            min_reaction_ms: avg_reaction_ms,
            hits: (accuracy / 10.0) as usize,
            total: 10,
        }
    }

    #[test]
    fn empty_history_summarizes_to_zeroes() {
        let summary = tracking_summary(&[], RECENT_SERIES_LEN);
        assert_eq!(summary, TrackingSummary::default());

        let summary = flicking_summary(&[], RECENT_SERIES_LEN);
        assert_eq!(summary, FlickingSummary::default());
    }

    #[test]
    fn tracking_summary_reduces_mean_and_best() {
        let records: Vec<_> = [40.0, 60.0, 80.0].into_iter().map(tracking).collect();
        let summary = tracking_summary(&records, 2);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.avg_t0, 60.0);
        assert_eq!(summary.best_t0, 80.0);
        assert_eq!(summary.recent, vec![60.0, 80.0]);
    }

    #[test]
    fn recent_series_is_chronological_tail() {
        let records: Vec<_> = (0..15).map(|i| tracking(i as f64)).collect();
        let summary = tracking_summary(&records, RECENT_SERIES_LEN);

        assert_eq!(summary.recent.len(), RECENT_SERIES_LEN);
        assert_eq!(summary.recent.first(), Some(&5.0));
        assert_eq!(summary.recent.last(), Some(&14.0));
    }

    #[test]
    fn flicking_reactions_skip_hitless_sessions() {
        let records = vec![
            flicking(70.0, Some(300.0)),
            flicking(0.0, None),
            flicking(90.0, Some(260.0)),
        ];
        let summary = flicking_summary(&records, RECENT_SERIES_LEN);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.avg_reaction_ms, 280.0);
        assert_eq!(summary.best_accuracy, 90.0);
        assert!(summary.reaction_spread_ms > 0.0);
    }

    #[test]
    fn input_records_are_untouched() {
        let records = vec![flicking(50.0, Some(400.0))];
        let before = records.clone();
        let _ = flicking_summary(&records, RECENT_SERIES_LEN);
        assert_eq!(records, before);
    }
}
