use std::sync::OnceLock;

use geo::Point;
use regex::Regex;
use tracing::warn;

use crate::{DegMinSec, DegMinSecExt as _};

fn lat_lon_regex() -> &'static Regex {
    static LAT_LON_RE: OnceLock<Regex> = OnceLock::new();
    LAT_LON_RE.get_or_init(|| {
        Regex::new(r"^(\d{2})(\d{2})(\d{2})?([NS])(\d{3})(\d{2})(\d{2})?([EW])$").unwrap()
    })
}

/// Decodes a `DDMM[SS](N|S)DDDMM[SS](E|W)` token into a point (`x` longitude, `y` latitude).
///
/// Everything except digits and hemisphere letters is stripped first, so
/// `4500N 04000E` and `4500n04000e` decode as well. Anything else yields `None`.
pub fn parse_lat_lon(token: &str) -> Option<Point> {
    let cleaned: String = token
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'N' | 'S' | 'W' | 'E'))
        .collect();

    let Some(captures) = lat_lon_regex().captures(&cleaned) else {
        warn!("unrecognised coordinate format: {token:?} (cleaned: {cleaned:?})");
        return None;
    };

    // all groups are fixed-width digit runs, so parsing cannot fail
    let part = |i: usize| {
        captures
            .get(i)
            .map_or(0, |m| m.as_str().parse::<u16>().unwrap_or_default())
    };
    let hemisphere = |i: usize| captures[i].chars().next().unwrap_or_default();

    let lat: DegMinSec = (part(1), part(2), part(3), hemisphere(4));
    let lng: DegMinSec = (part(5), part(6), part(7), hemisphere(8));

    Some(Point::from_deg_min_sec(lat, lng))
}
