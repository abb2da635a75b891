use chrono::{Local, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum accepted customer age, inclusive
pub const MIN_AGE: u32 = 18;
/// Maximum accepted customer age, inclusive
pub const MAX_AGE: u32 = 60;
/// Maximum length accepted for the name fields
pub const MAX_NAME_LENGTH: usize = 100;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern must compile"));

/// Inclusive range of birth dates satisfying the age policy, anchored at
/// `today`. The earliest date belongs to someone turning 60 today, the
/// latest to someone turning 18 today.
pub fn birth_date_range_on(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (subtract_years(today, MAX_AGE), subtract_years(today, MIN_AGE))
}

/// Birth date range for the current date, used to bound a date picker
pub fn birth_date_range() -> (NaiveDate, NaiveDate) {
    birth_date_range_on(Local::now().date_naive())
}

/// Whether a candidate birth date corresponds to an accepted age as of
/// today. The age is recomputed on every call; no age is ever stored.
pub fn is_valid_birth_date(birth_date: NaiveDate) -> bool {
    is_valid_birth_date_on(Local::now().date_naive(), birth_date)
}

fn is_valid_birth_date_on(today: NaiveDate, birth_date: NaiveDate) -> bool {
    let (earliest, latest) = birth_date_range_on(today);
    earliest <= birth_date && birth_date <= latest
}

fn subtract_years(date: NaiveDate, years: u32) -> NaiveDate {
    // Feb 29 clamps to Feb 28 in non-leap years
    date.checked_sub_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MIN)
}

/// Whether a string looks like a deliverable email address
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
