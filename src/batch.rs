use std::io;

use bevy_derive::{Deref, DerefMut};
use chrono::{DateTime, Utc};
use multimap::MultiMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    fields::Fields,
    html::{self, HtmlError},
    notam::{is_notam_id, Notam},
    read_to_string,
};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("failed to read NOTAM page: {0}")]
    FileRead(#[from] io::Error),
    #[error(transparent)]
    Html(#[from] HtmlError),
}

pub type BatchResult = Result<NotamBatch, BatchError>;

/// Records recovered from one page, in document order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Deref, DerefMut)]
pub struct NotamBatch(pub Vec<Notam>);

impl NotamBatch {
    /// Records grouped by their location indicator (item A).
    pub fn by_location(&self) -> MultiMap<String, &Notam> {
        self.iter()
            .filter_map(|notam| notam.location().map(|a| (a.to_string(), notam)))
            .collect()
    }

    pub fn active(&self) -> impl Iterator<Item = &Notam> {
        self.iter().filter(|notam| !notam.archive)
    }
}

impl IntoIterator for NotamBatch {
    type Item = Notam;
    type IntoIter = std::vec::IntoIter<Notam>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Turns raw NOTAM pages into records. Archive status is judged against `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotamParser {
    now: DateTime<Utc>,
}

impl Default for NotamParser {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

impl NotamParser {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn parse_bytes(&self, content: &[u8]) -> BatchResult {
        self.parse_html(&read_to_string(content)?)
    }

    pub fn parse_html(&self, html: &str) -> BatchResult {
        let notams = html::pre_blocks(html)?
            .iter()
            .filter_map(|block| self.parse_block(block))
            .collect();

        Ok(NotamBatch(notams))
    }

    /// Parses the text of a single bulletin. Blocks without a valid identifier
    /// line or without recoverable geometry yield `None`.
    pub fn parse_block(&self, block: &str) -> Option<Notam> {
        let block = block.trim();
        let mut lines = block.lines();
        let id = lines.next()?.trim();
        if id.is_empty() {
            return None;
        }

        if !is_notam_id(id) {
            warn!("skipping block, no valid NOTAM id: {id:?}");
            return None;
        }

        let notam = Notam::from_fields(id.to_string(), Fields::parse(lines), self.now);
        if notam.is_none() {
            debug!("{id}: no geometry found, dropping");
        }
        notam
    }
}

pub fn parse_notams(html: &str, now: DateTime<Utc>) -> BatchResult {
    NotamParser::at(now).parse_html(html)
}
