//! Month buckets over the dated collections.

use serde::{Deserialize, Serialize};

use crate::store::RecordStore;

// ---

pub const MONTHS: usize = 12;

/// Width of the window shown around the selected month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Month,
    Season,
    Year,
}

impl TimeRange {
    /// Months (zero-based) covered by this range around `month`.
    pub fn months(self, month: usize) -> Vec<usize> {
        // ---
        let month = month % MONTHS;
        match self {
            TimeRange::Month => vec![month],
            // Meteorological seasons: Dec-Feb, Mar-May, Jun-Aug, Sep-Nov
            TimeRange::Season => {
                let season = ((month + 1) % MONTHS) / 3;
                (0..3).map(|k| (season * 3 + 11 + k) % MONTHS).collect()
            }
            TimeRange::Year => (0..MONTHS).collect(),
        }
    }
}

/// Positions of dated records grouped by month, built once from the store.
#[derive(Debug, Clone)]
pub struct TimeIndex {
    observations: [Vec<usize>; MONTHS],
    citizen_reports: [Vec<usize>; MONTHS],
}

impl TimeIndex {
    pub fn build(store: &RecordStore) -> Self {
        // ---
        let mut observations: [Vec<usize>; MONTHS] = std::array::from_fn(|_| Vec::new());
        let mut citizen_reports: [Vec<usize>; MONTHS] = std::array::from_fn(|_| Vec::new());

        for (i, obs) in store.observations.iter().enumerate() {
            observations[obs.month()].push(i);
        }
        for (i, report) in store.citizen_reports.iter().enumerate() {
            citizen_reports[report.month()].push(i);
        }

        Self {
            observations,
            citizen_reports,
        }
    }

    pub fn observation_bucket(&self, month: usize) -> &[usize] {
        &self.observations[month % MONTHS]
    }

    /// Observation positions in the given months, in store order.
    pub fn observations_in(&self, months: &[usize]) -> Vec<usize> {
        collect_sorted(&self.observations, months)
    }

    pub fn citizen_reports_in(&self, months: &[usize]) -> Vec<usize> {
        collect_sorted(&self.citizen_reports, months)
    }

    pub fn observation_counts(&self) -> [usize; MONTHS] {
        std::array::from_fn(|m| self.observations[m].len())
    }
}

fn collect_sorted(buckets: &[Vec<usize>; MONTHS], months: &[usize]) -> Vec<usize> {
    let mut out: Vec<usize> = months
        .iter()
        .flat_map(|&m| buckets[m % MONTHS].iter().copied())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::store;
    use crate::tables::LookupTables;

    #[test]
    fn test_season_windows() {
        assert_eq!(TimeRange::Season.months(0), vec![11, 0, 1]);
        assert_eq!(TimeRange::Season.months(11), vec![11, 0, 1]);
        assert_eq!(TimeRange::Season.months(2), vec![2, 3, 4]);
        assert_eq!(TimeRange::Season.months(7), vec![5, 6, 7]);
        assert_eq!(TimeRange::Season.months(9), vec![8, 9, 10]);
    }

    #[test]
    fn test_month_and_year_windows() {
        assert_eq!(TimeRange::Month.months(4), vec![4]);
        assert_eq!(TimeRange::Year.months(4).len(), MONTHS);
    }

    #[test]
    fn test_buckets_partition_observations() {
        let store = store::generate(&LookupTables::default(), 12, 2024);
        let index = TimeIndex::build(&store);

        let counts = index.observation_counts();
        assert_eq!(counts.iter().sum::<usize>(), store.observations.len());

        for month in 0..MONTHS {
            for &i in index.observation_bucket(month) {
                assert_eq!(store.observations[i].month(), month);
            }
        }

        let all = index.observations_in(&TimeRange::Year.months(0));
        assert_eq!(all, (0..store.observations.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_citizen_reports_indexed_by_month() {
        let store = store::generate(&LookupTables::default(), 4, 2024);
        let index = TimeIndex::build(&store);

        let march = index.citizen_reports_in(&[2]);
        assert!(march.iter().all(|&i| store.citizen_reports[i].month() == 2));
        let total: usize = (0..MONTHS).map(|m| index.citizen_reports_in(&[m]).len()).sum();
        assert_eq!(total, store.citizen_reports.len());
    }
}
