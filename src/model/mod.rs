//! Per-process series: partition trace rows by pid and rebase the tick axis.

use crate::Result;
use crate::log::TraceRow;
use anyhow::bail;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;

/// Policy for a pid outside the declared range. Only consulted when
/// [`SeriesOptions::procs`] declares an expected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnknownPid {
    /// Abort the whole run.
    Fail,
    /// Skip the record.
    Drop,
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesOptions {
    /// Lowest pid expected in the trace.
    pub base_pid: i64,
    /// Expected process count. When set, pids outside
    /// `base_pid .. base_pid + procs` hit the `unknown` policy and all
    /// in-range buckets are pre-created. When unset, buckets grow on demand
    /// and every pid is accepted.
    pub procs: Option<usize>,
    pub unknown: UnknownPid,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            base_pid: 4,
            procs: None,
            unknown: UnknownPid::Fail,
        }
    }
}

/// One line of the plot: (tick offset, level) points for a single pid, in
/// trace order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcSeries {
    pub pid: i64,
    pub points: Vec<(f64, f64)>,
}

/// All per-process series plus the baseline they were rebased against.
/// Immutable once built; rendering only reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSet {
    /// Tick of the first record in the trace (0.0 for an empty trace).
    pub baseline: f64,
    /// Sorted by pid. May contain empty series when a range was declared.
    pub series: Vec<ProcSeries>,
}

impl SeriesSet {
    /// Series that actually carry points, i.e. what gets plotted.
    pub fn non_empty(&self) -> impl Iterator<Item = &ProcSeries> {
        self.series.iter().filter(|s| !s.points.is_empty())
    }
}

/// Single forward pass: the first row's tick becomes the baseline, and every
/// row appends `(tick - baseline, level)` to its pid's bucket. Bucket order
/// preserves trace order.
pub fn build_series(rows: &[TraceRow], opts: &SeriesOptions) -> Result<SeriesSet> {
    let mut buckets: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
    if let Some(n) = opts.procs {
        for pid in opts.base_pid..opts.base_pid + n as i64 {
            buckets.insert(pid, Vec::new());
        }
    }

    let mut baseline = 0.0;
    for (i, row) in rows.iter().enumerate() {
        if i == 0 {
            baseline = row.tick;
        }

        if let Some(n) = opts.procs {
            let end = opts.base_pid + n as i64;
            if row.pid < opts.base_pid || row.pid >= end {
                match opts.unknown {
                    UnknownPid::Fail => bail!(
                        "pid {} outside expected range {}..{} (line {} of trace)",
                        row.pid,
                        opts.base_pid,
                        end,
                        i + 1
                    ),
                    UnknownPid::Drop => continue,
                }
            }
        }

        buckets
            .entry(row.pid)
            .or_default()
            .push((row.tick - baseline, row.level));
    }

    Ok(SeriesSet {
        baseline,
        series: buckets
            .into_iter()
            .map(|(pid, points)| ProcSeries { pid, points })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(tick: f64, pid: i64, level: f64) -> TraceRow {
        TraceRow { tick, pid, level }
    }

    fn bucket<'a>(set: &'a SeriesSet, pid: i64) -> &'a ProcSeries {
        set.series.iter().find(|s| s.pid == pid).unwrap()
    }

    #[test]
    fn baseline_is_first_tick_and_first_x_is_zero() {
        let rows = [row(1270.0, 4, 1.0), row(1280.0, 5, 2.0)];
        let set = build_series(&rows, &SeriesOptions::default()).unwrap();
        assert_eq!(set.baseline, 1270.0);
        assert_eq!(bucket(&set, 4).points[0], (0.0, 1.0));
        assert_eq!(bucket(&set, 5).points[0], (10.0, 2.0));
    }

    #[test]
    fn level_passes_through_unchanged() {
        let rows = [row(0.0, 4, 7.25), row(1.0, 4, -3.0)];
        let set = build_series(&rows, &SeriesOptions::default()).unwrap();
        let ys: Vec<f64> = bucket(&set, 4).points.iter().map(|p| p.1).collect();
        assert_eq!(ys, vec![7.25, -3.0]);
    }

    #[test]
    fn partition_is_stable_per_pid() {
        let rows = [
            row(0.0, 4, 1.0),
            row(1.0, 5, 9.0),
            row(2.0, 4, 2.0),
            row(3.0, 5, 8.0),
            row(4.0, 4, 3.0),
        ];
        let set = build_series(&rows, &SeriesOptions::default()).unwrap();
        assert_eq!(
            bucket(&set, 4).points,
            vec![(0.0, 1.0), (2.0, 2.0), (4.0, 3.0)]
        );
        assert_eq!(bucket(&set, 5).points, vec![(1.0, 9.0), (3.0, 8.0)]);
    }

    #[test]
    fn without_declared_range_any_pid_gets_a_bucket() {
        let rows = [row(0.0, 3, 1.0), row(1.0, 42, 2.0)];
        let set = build_series(&rows, &SeriesOptions::default()).unwrap();
        assert_eq!(set.series.len(), 2);
        assert_eq!(bucket(&set, 3).points, vec![(0.0, 1.0)]);
        assert_eq!(bucket(&set, 42).points, vec![(1.0, 2.0)]);
    }

    #[test]
    fn drop_policy_ignores_out_of_range_pid() {
        let opts = SeriesOptions {
            procs: Some(5),
            unknown: UnknownPid::Drop,
            ..Default::default()
        };
        let rows = [row(0.0, 4, 1.0), row(1.0, 9, 5.0), row(2.0, 4, 2.0)];
        let set = build_series(&rows, &opts).unwrap();
        assert_eq!(bucket(&set, 4).points, vec![(0.0, 1.0), (2.0, 2.0)]);
        for pid in 5..9 {
            assert_eq!(bucket(&set, pid).points, vec![]);
        }
        assert!(set.series.iter().all(|s| s.pid != 9));
    }

    #[test]
    fn fail_policy_rejects_out_of_range_pid() {
        let opts = SeriesOptions {
            procs: Some(5),
            unknown: UnknownPid::Fail,
            ..Default::default()
        };
        let err = build_series(&[row(0.0, 3, 1.0)], &opts).unwrap_err();
        assert!(err.to_string().contains("pid 3"), "{err:#}");
    }

    #[test]
    fn declared_range_with_all_pids_present_fills_every_bucket() {
        let opts = SeriesOptions {
            procs: Some(5),
            unknown: UnknownPid::Fail,
            ..Default::default()
        };
        let rows: Vec<TraceRow> = (4..9).map(|pid| row(pid as f64, pid, 0.0)).collect();
        let set = build_series(&rows, &opts).unwrap();
        assert_eq!(set.non_empty().count(), 5);
    }

    #[test]
    fn end_to_end_three_line_scenario() {
        let rows = crate::log::parse_trace_str("0 4 0 10\n1 4 0 12\n2 5 0 20\n").unwrap();
        let opts = SeriesOptions {
            procs: Some(5),
            unknown: UnknownPid::Drop,
            ..Default::default()
        };
        let set = build_series(&rows, &opts).unwrap();
        assert_eq!(set.baseline, 0.0);
        assert_eq!(bucket(&set, 4).points, vec![(0.0, 10.0), (1.0, 12.0)]);
        assert_eq!(bucket(&set, 5).points, vec![(2.0, 20.0)]);
        let plotted: Vec<i64> = set.non_empty().map(|s| s.pid).collect();
        assert_eq!(plotted, vec![4, 5]);
    }

    #[test]
    fn empty_trace_builds_empty_set() {
        let set = build_series(&[], &SeriesOptions::default()).unwrap();
        assert_eq!(set.baseline, 0.0);
        assert!(set.series.is_empty());
    }
}
