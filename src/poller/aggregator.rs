use crate::client::types::{CoreStats, RawTransfer};
use crate::types::{AggregateStats, TransferFile};

/// Pure transformation of a raw stats snapshot into display-ready
/// per-file and whole-job metrics
pub struct ProgressAggregator;

impl ProgressAggregator {
    /// Derive a per-file row from one `transferring` entry
    pub fn per_file(raw: &RawTransfer) -> TransferFile {
        let percentage = if raw.size > 0 {
            let pct = (raw.bytes as f64 / raw.size as f64 * 100.0).round() as u64;
            pct.min(100) as u8
        } else {
            0
        };

        TransferFile {
            name: raw.name.clone(),
            bytes: raw.bytes,
            size: raw.size,
            speed: raw.speed,
            eta: raw.eta,
            src_fs: raw.src_fs.clone(),
            dst_fs: raw.dst_fs.clone(),
            percentage,
            is_error: percentage == 100 && raw.bytes < raw.size,
        }
    }

    /// Derive whole-job figures and the per-file rows from one snapshot.
    ///
    /// When file-level detail is present the combined speed comes from the
    /// active file set rather than the possibly stale backend figure; the
    /// byte totals come from the backend when it reports them, else from
    /// the file sums. ETA is remaining bytes over the chosen speed.
    pub fn aggregate(stats: &CoreStats) -> (AggregateStats, Vec<TransferFile>) {
        let files: Vec<TransferFile> = stats.transferring.iter().map(Self::per_file).collect();

        let active_files = files.iter().filter(|f| f.percentage < 100).count();

        let speed = if files.is_empty() {
            stats.speed
        } else {
            files
                .iter()
                .filter(|f| f.percentage < 100)
                .map(|f| f.speed)
                .sum()
        };

        let (bytes, total_bytes) = if stats.total_bytes > 0 {
            (stats.bytes, stats.total_bytes)
        } else {
            (
                files.iter().map(|f| f.bytes).sum(),
                files.iter().map(|f| f.size).sum(),
            )
        };

        let percentage = if total_bytes > 0 {
            let pct = (bytes as f64 / total_bytes as f64 * 100.0).round() as u64;
            pct.min(100) as u8
        } else {
            0
        };

        let remaining = total_bytes.saturating_sub(bytes);
        let eta = if speed > 0.0 {
            Some(remaining as f64 / speed)
        } else {
            stats.eta
        };

        (
            AggregateStats {
                bytes,
                total_bytes,
                speed,
                eta,
                percentage,
                active_files,
            },
            files,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, bytes: u64, size: u64, speed: f64) -> RawTransfer {
        RawTransfer {
            name: name.to_string(),
            size,
            bytes,
            speed,
            eta: None,
            src_fs: None,
            dst_fs: None,
        }
    }

    #[test]
    fn test_per_file_percentage_bounds() {
        assert_eq!(ProgressAggregator::per_file(&raw("a", 0, 1000, 0.0)).percentage, 0);
        assert_eq!(ProgressAggregator::per_file(&raw("a", 500, 1000, 0.0)).percentage, 50);
        assert_eq!(ProgressAggregator::per_file(&raw("a", 1000, 1000, 0.0)).percentage, 100);
        // Backend can briefly report bytes past the size
        assert_eq!(ProgressAggregator::per_file(&raw("a", 1500, 1000, 0.0)).percentage, 100);
    }

    #[test]
    fn test_per_file_unknown_size_is_zero_percent() {
        assert_eq!(ProgressAggregator::per_file(&raw("a", 500, 0, 0.0)).percentage, 0);
    }

    #[test]
    fn test_per_file_percentage_monotonic_for_fixed_size() {
        let mut last = 0;
        for bytes in (0..=1000).step_by(50) {
            let pct = ProgressAggregator::per_file(&raw("a", bytes, 1000, 0.0)).percentage;
            assert!(pct >= last);
            assert!(pct <= 100);
            last = pct;
        }
    }

    #[test]
    fn test_per_file_error_heuristic() {
        // Rounds to 100 while the byte count disagrees
        let file = ProgressAggregator::per_file(&raw("a", 999, 1000, 0.0));
        assert_eq!(file.percentage, 100);
        assert!(file.is_error);

        let done = ProgressAggregator::per_file(&raw("a", 1000, 1000, 0.0));
        assert!(!done.is_error);
    }

    #[test]
    fn test_aggregate_prefers_file_derived_speed() {
        let stats = CoreStats {
            bytes: 250,
            total_bytes: 1000,
            speed: 9999.0, // stale backend figure
            eta: None,
            transferring: vec![raw("a", 250, 1000, 100.0)],
            ..Default::default()
        };

        let (agg, files) = ProgressAggregator::aggregate(&stats);
        assert_eq!(files.len(), 1);
        assert_eq!(agg.percentage, 25);
        assert_eq!(agg.speed, 100.0);
        assert_eq!(agg.eta, Some(7.5));
        assert_eq!(agg.active_files, 1);
    }

    #[test]
    fn test_aggregate_falls_back_to_backend_totals() {
        let stats = CoreStats {
            bytes: 600,
            total_bytes: 1200,
            speed: 200.0,
            eta: Some(3.0),
            transferring: vec![],
            ..Default::default()
        };

        let (agg, files) = ProgressAggregator::aggregate(&stats);
        assert!(files.is_empty());
        assert_eq!(agg.bytes, 600);
        assert_eq!(agg.total_bytes, 1200);
        assert_eq!(agg.speed, 200.0);
        assert_eq!(agg.eta, Some(3.0));
        assert_eq!(agg.active_files, 0);
    }

    #[test]
    fn test_aggregate_sums_files_when_backend_totals_missing() {
        let stats = CoreStats {
            transferring: vec![raw("a", 500, 1000, 50.0), raw("b", 1000, 2000, 50.0)],
            ..Default::default()
        };

        let (agg, _) = ProgressAggregator::aggregate(&stats);
        assert_eq!(agg.bytes, 1500);
        assert_eq!(agg.total_bytes, 3000);
        assert_eq!(agg.percentage, 50);
        assert_eq!(agg.speed, 100.0);
        assert_eq!(agg.eta, Some(15.0));
    }

    #[test]
    fn test_aggregate_completed_files_excluded_from_speed() {
        let stats = CoreStats {
            bytes: 1500,
            total_bytes: 2000,
            transferring: vec![raw("done", 1000, 1000, 80.0), raw("live", 500, 1000, 40.0)],
            ..Default::default()
        };

        let (agg, _) = ProgressAggregator::aggregate(&stats);
        assert_eq!(agg.active_files, 1);
        assert_eq!(agg.speed, 40.0);
    }

    #[test]
    fn test_aggregate_zero_speed_has_no_derived_eta() {
        let stats = CoreStats {
            bytes: 100,
            total_bytes: 1000,
            transferring: vec![raw("stalled", 100, 1000, 0.0)],
            ..Default::default()
        };

        let (agg, _) = ProgressAggregator::aggregate(&stats);
        assert_eq!(agg.eta, None);
    }
}
