use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::{HarvestRequest, RequestStatus};

pub const UNKNOWN_CROP: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusDistribution {
    pub total: usize,
    pub pending: usize,
    pub pending_pct: f64,
    /// Assigned, accepted, scheduled or in progress.
    pub ongoing: usize,
    pub ongoing_pct: f64,
    pub completed: usize,
    pub cancelled: usize,
    pub by_status: BTreeMap<RequestStatus, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropShare {
    pub crop: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// "Mon YYYY", e.g. "May 2024".
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    pub status: StatusDistribution,
    pub crops: Vec<CropShare>,
    pub monthly: Vec<MonthBucket>,
}

impl Statistics {
    pub fn compute(requests: &[HarvestRequest]) -> Self {
        Self {
            status: status_distribution(requests),
            crops: crop_distribution(requests),
            monthly: monthly_trend(requests),
        }
    }
}

/// Share of `count` in `total`, in percent. Zero when there is nothing to divide.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

pub fn status_distribution(requests: &[HarvestRequest]) -> StatusDistribution {
    let mut by_status: BTreeMap<RequestStatus, usize> =
        RequestStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for request in requests {
        *by_status.entry(request.status).or_default() += 1;
    }

    let total = requests.len();
    let count_of = |status: RequestStatus| by_status.get(&status).copied().unwrap_or(0);
    let pending = count_of(RequestStatus::Pending);
    let ongoing = RequestStatus::ALL
        .iter()
        .filter(|status| status.is_ongoing())
        .map(|status| count_of(*status))
        .sum();

    StatusDistribution {
        total,
        pending,
        pending_pct: percentage(pending, total),
        ongoing,
        ongoing_pct: percentage(ongoing, total),
        completed: count_of(RequestStatus::Completed),
        cancelled: count_of(RequestStatus::Cancelled),
        by_status,
    }
}

/// Group-count by crop; blank or missing crops land under [`UNKNOWN_CROP`].
/// Largest group first, ties broken by name.
pub fn crop_distribution(requests: &[HarvestRequest]) -> Vec<CropShare> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for request in requests {
        let crop = request
            .crop
            .as_deref()
            .map(str::trim)
            .filter(|crop| !crop.is_empty())
            .unwrap_or(UNKNOWN_CROP);
        *counts.entry(crop).or_default() += 1;
    }

    let total = requests.len();
    let mut shares: Vec<CropShare> = counts
        .into_iter()
        .map(|(crop, count)| CropShare {
            crop: crop.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.crop.cmp(&b.crop)));
    shares
}

/// Submissions per calendar month, oldest first. Months without requests are
/// absent rather than zero-filled; requests with an unparsable `createdAt`
/// are skipped.
pub fn monthly_trend(requests: &[HarvestRequest]) -> Vec<MonthBucket> {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for created in requests.iter().filter_map(HarvestRequest::created_at) {
        *counts.entry((created.year(), created.month())).or_default() += 1;
    }

    counts
        .into_iter()
        .filter_map(|((year, month), count)| {
            let label = NaiveDate::from_ymd_opt(year, month, 1)?
                .format("%b %Y")
                .to_string();
            Some(MonthBucket {
                year,
                month,
                label,
                count,
            })
        })
        .collect()
}
