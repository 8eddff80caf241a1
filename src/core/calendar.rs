//! Off-day calendar.
//!
//! Holidays are supplied from outside (config seed or the remote mirror); the core only
//! reads them to lock planning and to mark days in reports.

use crate::{
    config::OffDayConfig,
    core::date,
    errors::Result,
    models::OffDay,
    store::{Collection, Store},
};

/// All off-days with normalized dates.
pub async fn off_days<S: Store>(store: &S) -> Result<Vec<OffDay>> {
    let days: Vec<OffDay> = store.get(Collection::OffDays).await?;
    Ok(days
        .into_iter()
        .map(|day| OffDay {
            date: date::normalize_date(&day.date),
            description: day.description,
        })
        .collect())
}

/// The off-day on `date`, if any.
#[must_use]
pub fn find_off_day<'a>(off_days: &'a [OffDay], date: &str) -> Option<&'a OffDay> {
    let key = date::normalize_date(date);
    off_days
        .iter()
        .find(|day| date::normalize_date(&day.date) == key)
}

/// Adds configured holidays whose date is not yet in the calendar. Returns how many
/// were added.
pub async fn seed_off_days<S: Store>(store: &S, seeds: &[OffDayConfig]) -> Result<usize> {
    let mut new_days = Vec::new();
    for seed in seeds {
        new_days.push(OffDay {
            date: date::canonical_date(&seed.date)?,
            description: seed.description.trim().to_string(),
        });
    }

    store
        .modify(Collection::OffDays, move |days: &mut Vec<OffDay>| {
            let mut added = 0;
            for day in new_days {
                if find_off_day(days, &day.date).is_none() {
                    days.push(day);
                    added += 1;
                }
            }
            Ok(added)
        })
        .await
}
