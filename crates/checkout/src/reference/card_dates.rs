//! Expiration month and year ranges for the card dropdowns.

/// Default number of years offered after the current one.
pub const DEFAULT_YEAR_WINDOW: u32 = 10;

/// Largest window [`credit_card_years`] will honour.
pub const MAX_YEAR_WINDOW: u32 = 50;

/// Months from `start_month` through December.
///
/// `start_month` is clamped into `1..=12`.
#[must_use]
pub fn credit_card_months(start_month: u32) -> Vec<u32> {
    (start_month.clamp(1, 12)..=12).collect()
}

/// Years from `first_year` through `first_year + window`, inclusive.
///
/// `window` is capped at [`MAX_YEAR_WINDOW`].
#[must_use]
pub fn credit_card_years(first_year: i32, window: u32) -> Vec<i32> {
    let window = i32::try_from(window.min(MAX_YEAR_WINDOW)).unwrap_or(0);
    (first_year..=first_year.saturating_add(window)).collect()
}
