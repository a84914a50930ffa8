use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{date::NotamDate, qline::QLine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotamType {
    #[default]
    Restricted,
    Danger,
    Airport,
    Navigation,
}

impl NotamType {
    /// Coarse type from the NOTAM code in the Q-line.
    pub fn classify(q: Option<&str>) -> Self {
        let Some(code) = q.filter(|q| q.contains('/')).and_then(|q| QLine::parse(q).code())
        else {
            return Self::default();
        };

        if code.starts_with("QRTCA") {
            Self::Danger
        } else if code.starts_with("QFA") {
            Self::Airport
        } else if code.starts_with("QNA") {
            Self::Navigation
        } else {
            Self::Restricted
        }
    }
}

impl Display for NotamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotamType::Restricted => "restricted",
            NotamType::Danger => "danger",
            NotamType::Airport => "airport",
            NotamType::Navigation => "navigation",
        })
    }
}

/// Whether item C (end of validity) lies strictly before `now`.
/// A missing or undecodable item C counts as still active.
pub fn is_archived(c: Option<&str>, now: DateTime<Utc>) -> bool {
    c.and_then(NotamDate::parse)
        .is_some_and(|end| end.is_before(now))
}
