//! Value normalisation applied after structural validation.

use chrono::{Datelike, NaiveDate};

use crate::params::ParameterStore;
use crate::taxonomy::control::{FROM, PAGE};
use crate::taxonomy::{SearchOperator, Taxonomy, ValueKind};

/// Rewrites a validated store into canonical form.
///
/// `page` becomes `from`, partial dates are expanded to concrete days and
/// identifier fragments become full URIs.
pub(crate) fn normalize<T: Taxonomy + ?Sized>(taxonomy: &T, store: &mut ParameterStore) {
    normalize_page(taxonomy, store);

    let rules = taxonomy.rules();
    for entry in store.entries_mut() {
        if entry.key.kind == ValueKind::Date {
            entry.value = expand_dates(entry.key.operator, &entry.value);
        }
        if let Some(prefix) = entry.key.uri_prefix {
            let delimiter = entry.key.operator.delimiter().to_string();
            let expanded = entry
                .elements()
                .iter()
                .map(|element| rules.expand_uri(prefix, element))
                .collect::<Vec<_>>()
                .join(&delimiter);
            entry.value = expanded;
        }
    }
}

fn normalize_page<T: Taxonomy + ?Sized>(taxonomy: &T, store: &mut ParameterStore) {
    let Some(page) = store.page() else {
        return;
    };
    let from = page.saturating_mul(store.size());
    store.remove(PAGE);
    if let Some(key) = taxonomy.key(FROM) {
        store.set(key, from.to_string());
    }
}

/// Expands partial dates for the given operator.
///
/// Lower bounds and `LessThan` take the first day of the period, the upper
/// bound of a pair takes the last. A lone value of a pair covers its whole
/// period.
pub fn expand_dates(operator: SearchOperator, value: &str) -> String {
    match operator {
        SearchOperator::Between => {
            let mut parts = value.splitn(2, ':');
            let lower = parts.next().unwrap_or_default().trim();
            match parts.next() {
                Some(upper) => {
                    let upper = upper.trim();
                    format!(
                        "{}:{}",
                        if lower.is_empty() { String::new() } else { period_start(lower) },
                        if upper.is_empty() { String::new() } else { period_end(upper) }
                    )
                }
                None => format!("{}:{}", period_start(lower), period_end(lower)),
            }
        }
        SearchOperator::GreaterOrEqual | SearchOperator::LessThan => period_start(value.trim()),
        _ => value.to_string(),
    }
}

/// First day of a `yyyy`, `yyyy-mm` or `yyyy-mm-dd` period.
pub fn period_start(value: &str) -> String {
    match date_parts(value) {
        Some((year, None, _)) => format!("{:04}-01-01", year),
        Some((year, Some(month), None)) => format!("{:04}-{:02}-01", year, month),
        _ => value.to_string(),
    }
}

/// Last day of a `yyyy`, `yyyy-mm` or `yyyy-mm-dd` period.
pub fn period_end(value: &str) -> String {
    match date_parts(value) {
        Some((year, None, _)) => format!("{:04}-12-31", year),
        Some((year, Some(month), None)) => match last_day_of_month(year, month) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => value.to_string(),
        },
        _ => value.to_string(),
    }
}

/// Whether a `yyyy`, `yyyy-mm` or `yyyy-mm-dd` value names a real period.
pub(crate) fn is_calendar_date(value: &str) -> bool {
    match date_parts(value) {
        Some((year, month, day)) => {
            NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1)).is_some()
        }
        None => false,
    }
}

fn date_parts(value: &str) -> Option<(i32, Option<u32>, Option<u32>)> {
    let mut parts = value.split('-');
    let year = parts.next()?.parse().ok()?;
    let month = match parts.next() {
        Some(month) => Some(month.parse().ok()?),
        None => None,
    };
    let day = match parts.next() {
        Some(day) => Some(day.parse().ok()?),
        None => None,
    };
    Some((year, month, day))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    next.pred_opt()
}
