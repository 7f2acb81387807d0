use chrono::NaiveDate;

use super::dates::{date_only, parse_date};

/// True when the expiry falls on a calendar day strictly before `today`.
///
/// Missing, sentinel, and unparseable values count as not expired; a document that expires
/// `today` is still valid for the whole day.
pub fn is_expired(expiry: Option<&str>, today: NaiveDate) -> bool {
    let normalized = date_only(expiry);
    if normalized.is_empty() {
        return false;
    }

    match parse_date(&normalized) {
        Ok(date) => date < today,
        Err(_) => false,
    }
}

/// True when at least one expiry in the batch is expired.
pub fn any_expired<'a, I>(expiries: I, today: NaiveDate) -> bool
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    expiries
        .into_iter()
        .any(|expiry| is_expired(expiry, today))
}
