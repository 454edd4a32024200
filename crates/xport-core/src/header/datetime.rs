//! SAS header datetime parsing.

use chrono::NaiveDateTime;

/// Parse a SAS header datetime of the form `ddMMMyy:hh:mm:ss`.
///
/// Only a 2-digit year is stored. Years above 76 are read as 19xx,
/// the rest as 20xx; 1976 is the year of the first SAS release, so no
/// transport file predates it. Unparseable input yields None; header
/// datetimes are informational and never fail a parse.
#[must_use]
pub fn parse_xpt_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.len() != 16 {
        return None;
    }
    let two_digit_year: u32 = text.get(5..7)?.parse().ok()?;
    let century = if two_digit_year > 76 { "19" } else { "20" };
    let full = format!("{}{}{}", &text[..5], century, &text[5..]);
    NaiveDateTime::parse_from_str(&full, "%d%b%Y:%H:%M:%S").ok()
}
