// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merges line coverage contributed by agents into running totals.

use super::{events::CoverageSample, helpers::round_half_up};
use swrite::{SWrite, swrite};

/// Running line-coverage totals, flattened across every file of every sample.
///
/// Per-file data is not retained once a sample has been merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CoverageAccumulator {
    called_lines: u64,
    covered_lines: u64,
    samples_merged: usize,
}

impl CoverageAccumulator {
    pub(crate) fn merge(&mut self, sample: &CoverageSample) {
        for (_, file) in sample.files() {
            self.called_lines = self.called_lines.saturating_add(file.called_lines);
            self.covered_lines = self.covered_lines.saturating_add(file.covered_lines);
        }
        self.samples_merged = self.samples_merged.saturating_add(1);
    }

    pub(crate) fn called_lines(&self) -> u64 {
        self.called_lines
    }

    pub(crate) fn covered_lines(&self) -> u64 {
        self.covered_lines
    }

    pub(crate) fn samples_merged(&self) -> usize {
        self.samples_merged
    }

    /// Returns `called / covered * 100`, or `None` if no line has been called.
    ///
    /// The ratio is called over covered, as agents have always reported it. If "covered" means
    /// executed lines this looks inverted, but the displayed figure is kept as-is.
    pub(crate) fn percent(&self) -> Option<f64> {
        (self.called_lines > 0)
            .then(|| self.called_lines as f64 / self.covered_lines as f64 * 100.0)
    }

    /// Writes the status-line coverage fragment, e.g. `"33% line coverage "`.
    ///
    /// Writes nothing if no line has been called.
    pub(crate) fn write_summary(&self, out: &mut String) {
        if let Some(percent) = self.percent() {
            swrite!(out, "{:.0}% line coverage ", round_half_up(percent, 0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::events::FileCoverage;
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn sample(files: &[(&str, u64, u64)]) -> CoverageSample {
        CoverageSample::new(files.iter().map(|&(path, called, covered)| {
            (
                path.to_owned(),
                FileCoverage {
                    called_lines: called,
                    covered_lines: covered,
                },
            )
        }))
    }

    fn summary(acc: &CoverageAccumulator) -> String {
        let mut out = String::new();
        acc.write_summary(&mut out);
        out
    }

    #[test]
    fn merges_same_file_additively() {
        let mut acc = CoverageAccumulator::default();
        acc.merge(&sample(&[("fileA", 3, 10)]));
        acc.merge(&sample(&[("fileA", 2, 5)]));

        assert_eq!(acc.called_lines(), 5);
        assert_eq!(acc.covered_lines(), 15);
        assert_eq!(acc.samples_merged(), 2);
        assert_eq!(summary(&acc), "33% line coverage ");
    }

    #[test]
    fn flattens_across_files() {
        let mut acc = CoverageAccumulator::default();
        acc.merge(&sample(&[("a.js", 1, 4), ("b.js", 2, 5)]));
        assert_eq!((acc.called_lines(), acc.covered_lines()), (3, 9));
        assert_eq!(summary(&acc), "33% line coverage ");
    }

    #[test]
    fn no_called_lines_means_no_summary() {
        let mut acc = CoverageAccumulator::default();
        assert_eq!(acc.percent(), None);
        assert_eq!(summary(&acc), "");

        acc.merge(&sample(&[("a.js", 0, 40)]));
        assert_eq!(acc.percent(), None);
        assert_eq!(summary(&acc), "");

        acc.merge(&CoverageSample::default());
        assert_eq!(acc.samples_merged(), 2);
        assert_eq!(summary(&acc), "");
    }

    #[test]
    fn ratio_is_called_over_covered() {
        let mut acc = CoverageAccumulator::default();
        acc.merge(&sample(&[("a.js", 30, 20)]));
        assert_eq!(acc.percent(), Some(150.0));
        assert_eq!(summary(&acc), "150% line coverage ");
    }

    #[test]
    fn ties_round_up() {
        let mut acc = CoverageAccumulator::default();
        acc.merge(&sample(&[("a.js", 1, 8)]));
        assert_eq!(acc.percent(), Some(12.5));
        assert_eq!(summary(&acc), "13% line coverage ");
    }

    #[test]
    fn totals_saturate() {
        let mut acc = CoverageAccumulator::default();
        acc.merge(&sample(&[("a.js", u64::MAX / 2 + 1, u64::MAX)]));
        acc.merge(&sample(&[("a.js", u64::MAX / 2 + 1, 1)]));
        assert_eq!((acc.called_lines(), acc.covered_lines()), (u64::MAX, u64::MAX));
        assert_eq!(summary(&acc), "100% line coverage ");
    }

    fn arb_samples() -> impl Strategy<Value = Vec<Vec<(u8, u32, u32)>>> {
        prop::collection::vec(
            prop::collection::vec((0u8..4, 0u32..1000, 0u32..1000), 0..4),
            0..8,
        )
    }

    #[proptest]
    fn merge_order_is_irrelevant(#[strategy(arb_samples())] samples: Vec<Vec<(u8, u32, u32)>>) {
        let samples: Vec<CoverageSample> = samples
            .into_iter()
            .map(|files| {
                CoverageSample::new(files.into_iter().map(|(file, called, covered)| {
                    (
                        format!("file{file}.js"),
                        FileCoverage {
                            called_lines: u64::from(called),
                            covered_lines: u64::from(covered),
                        },
                    )
                }))
            })
            .collect();

        let mut forward = CoverageAccumulator::default();
        for sample in &samples {
            forward.merge(sample);
        }
        let mut backward = CoverageAccumulator::default();
        for sample in samples.iter().rev() {
            backward.merge(sample);
        }

        prop_assert_eq!(forward, backward);
    }
}
