use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

const FULL_FORMAT: &str = "%Y-%m-%d";
const MONTH_LEN: usize = "YYYY-MM".len();

/// A calendar date as it crosses the API boundary.
///
/// Accepts either a full `YYYY-MM-DD` date or a bare `YYYY-MM` month, which
/// resolves to the first day of that month. The two forms are told apart by
/// input length alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubDate(NaiveDate);

impl SubDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl FromStr for SubDate {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = if value.len() == MONTH_LEN {
            NaiveDate::parse_from_str(&format!("{}-01", value), FULL_FORMAT)
        } else {
            NaiveDate::parse_from_str(value, FULL_FORMAT)
        };

        parsed
            .map(Self)
            .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD or YYYY-MM", value))
    }
}

impl From<SubDate> for NaiveDate {
    fn from(date: SubDate) -> Self {
        date.0
    }
}

impl From<NaiveDate> for SubDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for SubDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FULL_FORMAT))
    }
}
