use chrono::NaiveDate;

/// Expiry value the backend persists for documents without a due date.
pub const NO_EXPIRY_SENTINEL: &str = "2999-12-31";

const NO_EXPIRY_LABEL: &str = "Sin caducidad";

/// Reduce a raw expiry value to its `YYYY-MM-DD` portion.
///
/// Returns an empty string when the value is missing, blank, or the no-expiry sentinel.
/// Unparseable input is passed through so callers can apply their own validity check.
pub fn date_only(value: Option<&str>) -> String {
    let raw = value.unwrap_or_default().trim();
    if raw.is_empty() {
        return String::new();
    }

    let normalized = match raw.split_once('T') {
        Some((date, _)) => date,
        None => raw.char_indices().nth(10).map_or(raw, |(idx, _)| &raw[..idx]),
    };

    if normalized == NO_EXPIRY_SENTINEL {
        String::new()
    } else {
        normalized.to_string()
    }
}

/// Expiry value to send when registering or editing a document; blank means "never expires".
pub fn expiry_for_submission(value: Option<&str>) -> String {
    let raw = value.unwrap_or_default().trim();
    if raw.is_empty() {
        NO_EXPIRY_SENTINEL.to_string()
    } else {
        raw.to_string()
    }
}

/// Human label for an expiry column (es-ES day/month/year).
pub fn expiry_label(value: Option<&str>) -> String {
    let normalized = date_only(value);
    if normalized.is_empty() {
        return NO_EXPIRY_LABEL.to_string();
    }

    match parse_date(&normalized) {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => normalized,
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
