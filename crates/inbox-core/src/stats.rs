//! Read-only aggregates over the submission collection.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::submission::{Category, Status, Submission};

/// Length of the trailing window for [`Stats::daily`].
pub const TRAILING_DAYS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
  /// UTC calendar date.
  pub date:  NaiveDate,
  pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub total:       usize,
  /// One entry per status, zero-filled.
  pub by_status:   BTreeMap<Status, usize>,
  /// One entry per category, zero-filled.
  pub by_category: BTreeMap<Category, usize>,
  /// One bucket per UTC calendar date, the last [`TRAILING_DAYS`] dates up
  /// to and including the date of `now`, oldest first. The window is counted
  /// in whole dates, not as a rolling 30×24h period: anything created on the
  /// oldest date counts whatever its time of day, anything from the date
  /// before does not. Dates without submissions count zero.
  pub daily:       Vec<DailyCount>,
}

impl Stats {
  pub fn compute(submissions: &[Submission], now: DateTime<Utc>) -> Self {
    let mut by_status: BTreeMap<Status, usize> =
      Status::iter().map(|s| (s, 0)).collect();
    let mut by_category: BTreeMap<Category, usize> =
      Category::iter().map(|c| (c, 0)).collect();

    let today = now.date_naive();
    let first = today
      .checked_sub_days(Days::new(TRAILING_DAYS - 1))
      .unwrap_or(NaiveDate::MIN);
    let mut days: BTreeMap<NaiveDate, usize> = first
      .iter_days()
      .take_while(|d| *d <= today)
      .map(|d| (d, 0))
      .collect();

    for s in submissions {
      *by_status.entry(s.status).or_default() += 1;
      *by_category.entry(s.category).or_default() += 1;
      if let Some(count) = days.get_mut(&s.created_at.date_naive()) {
        *count += 1;
      }
    }

    Self {
      total: submissions.len(),
      by_status,
      by_category,
      daily: days
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect(),
    }
  }
}
