use geo::{LineString, Point, Polygon};
use itertools::Itertools as _;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uom::si::f64::Length;
use uom::si::length::{kilometer, nautical_mile};

use crate::{
    coordinate::parse_lat_lon,
    fields::Fields,
    qline::{parse_geo_radius, QLine},
};

static POLYGON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4,6}[NS]\d{5,7}[EW](?:-\d{4,6}[NS]\d{5,7}[EW]){2,}").unwrap()
});

// The radius is read from its leading number (`1.2.3KM` is 1.2 km). A zero
// radius is not a circle and falls through to the Q-line.
static CIRCLE_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(
        r"WI\s+CIRCLE\s+RADIUS\s+([\d.]+)(KM|NM)\s+CENTRE\s*(\d{4,8}[NS]\d{5,9}[EW])",
    )
    .case_insensitive(true)
    .build()
    .unwrap()
});

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    /// Serialized in metres.
    pub radius: Length,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Geometry {
    /// Vertices in the order given by the bulletin, the ring is not closed.
    AreaPolygon(Vec<Point>),
    Circle(Circle),
    Point(Point),
}

impl Geometry {
    /// The area as a closed `geo` polygon, for the polygon variant only.
    pub fn to_polygon(&self) -> Option<Polygon> {
        match self {
            Geometry::AreaPolygon(vertices) => Some(Polygon::new(
                LineString::from(vertices.clone()),
                vec![],
            )),
            Geometry::Circle(_) | Geometry::Point(_) => None,
        }
    }

    pub fn center(&self) -> Point {
        match self {
            Geometry::AreaPolygon(vertices) => {
                let n = vertices.len() as f64;
                let (x, y) = vertices
                    .iter()
                    .fold((0.0, 0.0), |(x, y), p| (x + p.x(), y + p.y()));
                Point::new(x / n, y / n)
            }
            Geometry::Circle(circle) => circle.center,
            Geometry::Point(point) => *point,
        }
    }
}

/// Recovers the shape of a NOTAM: a polygon in item E, then a circle in item E,
/// then the Q-line geography. The first source that yields a shape wins.
pub fn resolve(fields: &Fields) -> Option<Geometry> {
    let from_e = fields
        .e
        .as_deref()
        .and_then(|e| polygon_from_text(e).or_else(|| circle_from_text(e)));

    from_e.or_else(|| fields.q.as_deref().and_then(from_qline))
}

fn polygon_from_text(text: &str) -> Option<Geometry> {
    let joined = text.replace('\n', "");
    let run = POLYGON_RE.find(&joined)?.as_str();
    let run = run.strip_suffix(['.', ',']).unwrap_or(run);

    let vertices = run
        .split('-')
        .filter(|part| !part.is_empty())
        .filter_map(parse_lat_lon)
        .collect_vec();

    if vertices.len() >= 3 {
        Some(Geometry::AreaPolygon(vertices))
    } else {
        debug!("abandoning polygon with {} valid vertices: {run}", vertices.len());
        None
    }
}

fn circle_from_text(text: &str) -> Option<Geometry> {
    let captures = CIRCLE_RE.captures(text)?;

    let value = leading_float(&captures[1]).filter(|v| v.is_finite() && *v > 0.0)?;
    let radius = if captures[2].eq_ignore_ascii_case("KM") {
        Length::new::<kilometer>(value)
    } else {
        Length::new::<nautical_mile>(value)
    };
    let center = parse_lat_lon(&captures[3])?;

    Some(Geometry::Circle(Circle { center, radius }))
}

fn from_qline(q: &str) -> Option<Geometry> {
    let qline = QLine::parse(q);
    if qline.part_count() < 8 {
        return None;
    }
    let geo = qline.geo()?;

    if let Some(circle) = parse_geo_radius(geo) {
        return Some(Geometry::Circle(circle));
    }

    let center = parse_lat_lon(geo)?;
    match qline.radius().and_then(leading_integer).filter(|nm| *nm > 0) {
        Some(nm) => Some(Geometry::Circle(Circle {
            center,
            radius: Length::new::<nautical_mile>(f64::from(nm)),
        })),
        None => Some(Geometry::Point(center)),
    }
}

/// Integer made of the leading digits, ignoring whatever follows (`"005NM"` is 5).
fn leading_integer(s: &str) -> Option<u32> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Number made of digits and the first `.` of a digit/dot run (`"1.2.3"` is 1.2).
fn leading_float(s: &str) -> Option<f64> {
    let end = s.match_indices('.').nth(1).map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}
