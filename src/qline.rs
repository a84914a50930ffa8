use std::sync::OnceLock;

use geo::Point;
use regex::Regex;
use uom::si::f64::Length;
use uom::si::length::nautical_mile;

use crate::{geometry::Circle, DegMinSecExt as _};

fn geo_radius_regex() -> &'static Regex {
    static GEO_RADIUS_RE: OnceLock<Regex> = OnceLock::new();
    GEO_RADIUS_RE
        .get_or_init(|| Regex::new(r"^(\d{2})(\d{2})([NS])(\d{3})(\d{2})([EW])(\d{3})$").unwrap())
}

/// Borrowed view over the `/`-separated parts of a Q-line:
/// `FIR/QCODE/TRAFFIC/PURPOSE/SCOPE/LOWER/UPPER/GEO[/RADIUS]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QLine<'a> {
    parts: Vec<&'a str>,
}

impl<'a> QLine<'a> {
    pub fn parse(q: &'a str) -> Self {
        Self {
            parts: q.split('/').map(str::trim).collect(),
        }
    }

    /// Number of `/`-separated parts, empty ones included.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn part(&self, index: usize) -> Option<&'a str> {
        self.parts.get(index).copied()
    }

    pub fn fir(&self) -> Option<&'a str> {
        self.part(0)
    }

    /// The NOTAM code (`QRTCA`, `QFALC`, ...). Only present when the line contains a `/`.
    pub fn code(&self) -> Option<&'a str> {
        self.part(1)
    }

    pub fn lower_limit(&self) -> Option<&'a str> {
        self.part(5)
    }

    pub fn upper_limit(&self) -> Option<&'a str> {
        self.part(6)
    }

    pub fn geo(&self) -> Option<&'a str> {
        self.part(7)
    }

    /// Radius following a bare centre in the geo part, as emitted by some sources.
    pub fn radius(&self) -> Option<&'a str> {
        self.part(8)
    }
}

/// Decodes the combined `DDMM(N|S)DDDMM(E|W)RRR` token (radius in nautical miles).
pub fn parse_geo_radius(token: &str) -> Option<Circle> {
    let captures = geo_radius_regex().captures(token)?;
    let number = |i: usize| captures[i].parse::<u16>().ok();
    let hemisphere = |i: usize| captures[i].chars().next();

    let radius_nm = number(7)?;
    if radius_nm == 0 {
        return None;
    }

    let center = Point::from_deg_min_sec(
        (number(1)?, number(2)?, 0, hemisphere(3)?),
        (number(4)?, number(5)?, 0, hemisphere(6)?),
    );

    Some(Circle {
        center,
        radius: Length::new::<nautical_mile>(f64::from(radius_nm)),
    })
}
