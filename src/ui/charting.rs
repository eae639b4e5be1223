use itertools::Itertools;
use itertools::MinMaxResult;

/// Y bounds for a recent-session series, padded so a flat series still has
/// visible extent.
pub fn series_bounds(series: &[f64]) -> (f64, f64) {
    match series.iter().copied().minmax() {
        MinMaxResult::NoElements => (0.0, 100.0),
        MinMaxResult::OneElement(v) => ((v - 1.0).max(0.0), v + 1.0),
        MinMaxResult::MinMax(lo, hi) => {
            if hi - lo < 1.0 {
                ((lo - 1.0).max(0.0), hi + 1.0)
            } else {
                (lo, hi)
            }
        }
    }
}

/// Index the series for a Chart dataset.
pub fn series_points(series: &[f64]) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect()
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_gets_percent_bounds() {
        assert_eq!(series_bounds(&[]), (0.0, 100.0));
    }

    #[test]
    fn flat_series_gets_padded_bounds() {
        let (lo, hi) = series_bounds(&[50.0, 50.0]);
        assert!(lo < 50.0 && hi > 50.0);
    }

    #[test]
    fn varied_series_uses_min_max() {
        assert_eq!(series_bounds(&[30.0, 70.0, 55.0]), (30.0, 70.0));
    }

    #[test]
    fn points_are_indexed() {
        assert_eq!(
            series_points(&[10.0, 20.0]),
            vec![(0.0, 10.0), (1.0, 20.0)]
        );
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
