use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::Notam;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to read/write NOTAM cache: {0}")]
    FileRead(#[from] io::Error),
    #[error("failed to (de)serialize NOTAM cache: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Previously fetched records, split by archive status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotamCache {
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub notams: Vec<Notam>,
    #[serde(default)]
    pub archived_notams: Vec<Notam>,
}

/// Outcome of merging a fresh fetch into the cache.
#[derive(Clone, Debug, PartialEq)]
pub struct Merged {
    pub cache: NotamCache,
    /// Ids that were not among the previously cached active records.
    pub new_ids: HashSet<String>,
}

impl NotamCache {
    pub const STALE_AFTER: TimeDelta = TimeDelta::minutes(15);

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        !self.notams.is_empty() && now - self.last_updated < Self::STALE_AFTER
    }

    pub fn from_json(content: &[u8]) -> CacheResult<Self> {
        Ok(serde_json::from_slice(content)?)
    }

    pub fn to_json(&self) -> CacheResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn load(path: &Path) -> CacheResult<Self> {
        Self::from_json(&fs_err::read(path)?)
    }

    pub fn save(&self, path: &Path) -> CacheResult<()> {
        fs_err::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Combines cached and freshly fetched records. Fetched records replace cached
    /// ones with the same id, archive flags are re-evaluated against `now`.
    pub fn merge(
        previous: Option<&NotamCache>,
        fetched: impl IntoIterator<Item = Notam>,
        now: DateTime<Utc>,
    ) -> Merged {
        let known_ids: HashSet<&str> = previous
            .map(|cache| cache.notams.iter().map(|n| n.id.as_str()).collect())
            .unwrap_or_default();

        let mut order: Vec<Notam> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let cached = previous
            .into_iter()
            .flat_map(|cache| cache.notams.iter().chain(&cache.archived_notams).cloned());

        for notam in cached.chain(fetched) {
            match index.get(&notam.id) {
                Some(&i) => order[i] = notam,
                None => {
                    index.insert(notam.id.clone(), order.len());
                    order.push(notam);
                }
            }
        }

        for notam in &mut order {
            notam.refresh_archive(now);
        }

        let new_ids: HashSet<String> = order
            .iter()
            .filter(|notam| !known_ids.contains(notam.id.as_str()))
            .map(|notam| notam.id.clone())
            .collect();

        let (archived_notams, notams): (Vec<_>, Vec<_>) =
            order.into_iter().partition(|notam| notam.archive);

        debug!(
            "merged {} active, {} archived, {} new",
            notams.len(),
            archived_notams.len(),
            new_ids.len()
        );

        Merged {
            cache: NotamCache {
                last_updated: now,
                notams,
                archived_notams,
            },
            new_ids,
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;
    use std::env;

    use chrono::{TimeDelta, TimeZone as _, Utc};

    use super::NotamCache;
    use crate::{fields::Fields, Notam};

    fn notam(id: &str, c: &str, e: &str) -> Notam {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let fields = Fields {
            q: Some("UUWV/QRTCA/IV/BO/W/000/999/5545N03735E005".to_string()),
            c: Some(c.to_string()),
            e: Some(e.to_string()),
            ..Default::default()
        };
        Notam::from_fields(id.to_string(), fields, now).unwrap()
    }

    #[test]
    fn test_merge() {
        let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let previous = NotamCache {
            last_updated: t0,
            notams: vec![
                notam("A0001/24 NOTAMN", "2403010000", "OLD TEXT"),
                notam("A0002/24 NOTAMN", "2402150000", "EXPIRES SOON"),
            ],
            archived_notams: vec![notam("A0000/24 NOTAMN", "2401150000", "EXPIRED")],
        };

        let fetched = vec![
            notam("A0001/24 NOTAMN", "2403010000", "NEW TEXT"),
            notam("A0003/24 NOTAMN", "PERM", "BRAND NEW"),
        ];

        let now = Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap();
        let merged = NotamCache::merge(Some(&previous), fetched, now);

        let active: Vec<_> = merged.cache.notams.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(active, vec!["A0001/24 NOTAMN", "A0003/24 NOTAMN"]);
        assert_eq!(
            merged.cache.notams[0].fields.e.as_deref(),
            Some("NEW TEXT")
        );

        let archived: Vec<_> = merged
            .cache
            .archived_notams
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(archived, vec!["A0002/24 NOTAMN", "A0000/24 NOTAMN"]);

        // the archived record was not among the cached active ones
        assert_eq!(
            merged.new_ids,
            HashSet::from(["A0003/24 NOTAMN".to_string(), "A0000/24 NOTAMN".to_string()])
        );
        assert_eq!(merged.cache.last_updated, now);
    }

    #[test]
    fn test_merge_without_cache() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let merged = NotamCache::merge(None, vec![notam("A0001/24 NOTAMN", "2403010000", "X")], now);

        assert_eq!(merged.cache.notams.len(), 1);
        assert!(merged.cache.archived_notams.is_empty());
        assert_eq!(merged.new_ids.len(), 1);
    }

    #[test]
    fn test_is_fresh() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut cache = NotamCache {
            last_updated: t0,
            notams: vec![notam("A0001/24 NOTAMN", "2403010000", "X")],
            archived_notams: vec![],
        };

        assert!(cache.is_fresh(t0 + TimeDelta::minutes(14)));
        assert!(!cache.is_fresh(t0 + TimeDelta::minutes(15)));

        cache.notams.clear();
        assert!(!cache.is_fresh(t0));
    }

    #[test]
    fn test_save_load() {
        let cache = NotamCache {
            last_updated: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            notams: vec![notam(
                "A0001/24 NOTAMN",
                "2403010000",
                "AREA 4500N04000E-4510N04010E-4520N04020E",
            )],
            archived_notams: vec![notam("A0000/24 NOTAMN", "2312010000", "WI CIRCLE RADIUS 5KM CENTRE 4500N04000E")],
        };

        let path = env::temp_dir().join(format!("notam-cache-{}.json", std::process::id()));
        cache.save(&path).unwrap();
        let loaded = NotamCache::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.last_updated, cache.last_updated);
        for (loaded, original) in loaded
            .notams
            .iter()
            .chain(&loaded.archived_notams)
            .zip(cache.notams.iter().chain(&cache.archived_notams))
        {
            assert_eq!(loaded.id, original.id);
            assert_eq!(loaded.fields, original.fields);
            assert_eq!(loaded.archive, original.archive);
            assert_eq!(
                std::mem::discriminant(&loaded.geometry),
                std::mem::discriminant(&original.geometry)
            );
        }
        assert_eq!(loaded.notams.len(), 1);
        assert_eq!(loaded.archived_notams.len(), 1);
    }

    #[test]
    fn test_load_missing_and_invalid() {
        assert!(NotamCache::load(&env::temp_dir().join("does-not-exist-notam-cache.json")).is_err());
        assert!(NotamCache::from_json(b"{\"notams\": 5}").is_err());
    }
}
