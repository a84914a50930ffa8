use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    classify::{is_archived, NotamType},
    date::NotamDate,
    fields::Fields,
    geometry::{self, Geometry},
};

static NOTAM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]\d{4,5}/\d{2}\s*NOTAM[NRC]").unwrap());

/// Whether a (trimmed) line starts with a NOTAM identifier such as `A1234/24 NOTAMN`.
pub fn is_notam_id(line: &str) -> bool {
    NOTAM_ID_RE.is_match(line)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notam {
    /// The full identifier line, e.g. `A1234/24 NOTAMR A1000/24`.
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
    pub notam_type: NotamType,
    pub archive: bool,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Notam {
    /// Builds a record from tokenized items, or `None` when no shape can be recovered.
    pub fn from_fields(id: String, fields: Fields, now: DateTime<Utc>) -> Option<Self> {
        let geometry = geometry::resolve(&fields)?;

        Some(Self {
            notam_type: NotamType::classify(fields.q.as_deref()),
            archive: is_archived(fields.c.as_deref(), now),
            id,
            fields,
            geometry,
        })
    }

    /// Re-evaluates the archive flag against a later instant. Keeps the previous
    /// value when item C cannot be decoded.
    pub fn refresh_archive(&mut self, now: DateTime<Utc>) {
        if let Some(end) = self.fields.c.as_deref().and_then(NotamDate::parse) {
            self.archive = end.is_before(now);
        }
    }

    /// Location indicator from item A.
    pub fn location(&self) -> Option<&str> {
        self.fields.a.as_deref().map(str::trim)
    }

    pub fn is_unlimited_height(&self) -> bool {
        self.fields
            .g
            .as_deref()
            .is_some_and(|g| g.eq_ignore_ascii_case("UNL"))
    }
}
