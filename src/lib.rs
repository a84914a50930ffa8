use std::io;

use geo::{Coord, Point};
use tracing::warn;

pub mod batch;
pub mod cache;
pub mod classify;
pub mod coordinate;
pub mod date;
pub mod describe;
pub mod fields;
pub mod filter;
pub mod geometry;
pub mod html;
pub mod notam;
pub mod qline;

pub use batch::{parse_notams, NotamBatch, NotamParser};
pub use notam::Notam;

fn read_to_string(contents: &[u8]) -> Result<String, io::Error> {
    String::from_utf8(contents.to_vec()).or_else(|_| {
        let (string, _, errors) = encoding_rs::WINDOWS_1252.decode(contents);
        if errors {
            warn!("errors while decoding win-1252");
        }
        Ok(string.to_string())
    })
}

/// Unsigned degrees, minutes, seconds and the hemisphere letter (`N`, `S`, `E`, `W`).
pub type DegMinSec = (u16, u16, u16, char);

fn signed_decimal((deg, min, sec, hemisphere): DegMinSec) -> f64 {
    let decimal = f64::from(deg) + f64::from(min) / 60.0 + f64::from(sec) / 3600.0;
    if matches!(hemisphere, 'S' | 'W') {
        -decimal
    } else {
        decimal
    }
}

fn decimal_to_dms(decimal: f64, is_latitude: bool) -> DegMinSec {
    let total_seconds = (decimal.abs() * 3600.0).round() as u32;
    let degrees = (total_seconds / 3600) as u16;
    let minutes = ((total_seconds % 3600) / 60) as u16;
    let seconds = (total_seconds % 60) as u16;

    let direction = match (is_latitude, decimal.is_sign_negative()) {
        (true, false) => 'N',
        (true, true) => 'S',
        (false, false) => 'E',
        (false, true) => 'W',
    };

    (degrees, minutes, seconds, direction)
}

/// Conversion between decimal coordinates and the compact `DDMMSSN DDDMMSSE`
/// notation used throughout NOTAM text.
pub trait DegMinSecExt {
    fn from_deg_min_sec(lat: DegMinSec, lng: DegMinSec) -> Self;
    fn lat_notam_fmt(&self) -> String;
    fn lng_notam_fmt(&self) -> String;
    fn notam_fmt(&self) -> String {
        format!("{}{}", self.lat_notam_fmt(), self.lng_notam_fmt())
    }
}

impl DegMinSecExt for Coord {
    fn from_deg_min_sec(lat: DegMinSec, lng: DegMinSec) -> Self {
        Self {
            y: signed_decimal(lat),
            x: signed_decimal(lng),
        }
    }

    fn lat_notam_fmt(&self) -> String {
        let (deg, min, sec, hemisphere) = decimal_to_dms(self.y, true);
        format!("{deg:02}{min:02}{sec:02}{hemisphere}")
    }

    fn lng_notam_fmt(&self) -> String {
        let (deg, min, sec, hemisphere) = decimal_to_dms(self.x, false);
        format!("{deg:03}{min:02}{sec:02}{hemisphere}")
    }
}

impl DegMinSecExt for Point {
    fn from_deg_min_sec(lat: DegMinSec, lng: DegMinSec) -> Self {
        Coord::from_deg_min_sec(lat, lng).into()
    }

    fn lat_notam_fmt(&self) -> String {
        self.0.lat_notam_fmt()
    }

    fn lng_notam_fmt(&self) -> String {
        self.0.lng_notam_fmt()
    }
}

#[cfg(test)]
mod test {
    use geo::Coord;

    use crate::DegMinSecExt as _;

    #[test]
    fn test_dms_roundtrip() {
        let lat = (48, 40, 0, 'N');
        let lng = (10, 58, 30, 'E');
        let coord = Coord::from_deg_min_sec(lat, lng);
        let expected = 48.666_666_666_666_666;
        assert!(
            (coord.y - expected).abs() < 1e-12,
            "left: {:?} not equal right: {:?}",
            coord.y,
            expected
        );
        let expected = 10.975;
        assert!(
            (coord.x - expected).abs() < 1e-12,
            "left: {:?} not equal right: {:?}",
            coord.x,
            expected
        );
        assert_eq!(coord.notam_fmt(), "484000N0105830E");
    }

    #[test]
    fn test_dms_southern_western() {
        let coord = Coord::from_deg_min_sec((0, 30, 0, 'S'), (1, 15, 0, 'W'));
        assert!((coord.y + 0.5).abs() < 1e-12);
        assert!((coord.x + 1.25).abs() < 1e-12);
        assert_eq!(coord.notam_fmt(), "003000S0011500W");
    }
}
