use std::{env::args_os, io};

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};
use notam_parser::{geometry::Geometry, NotamParser};
use serde_json::Map;
use uom::si::length::meter;

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let html_path = args_os()
        .nth(1)
        .expect("missing argument: path to NOTAM .html page");
    let geojson_path = args_os()
        .nth(2)
        .expect("missing argument: path to .geojson output");

    let batch = NotamParser::default()
        .parse_bytes(&fs_err::read(html_path).unwrap())
        .expect("unsuccessful parse");

    let feature_collection = FeatureCollection::from_iter(batch.into_iter().map(|notam| {
        let mut properties = Map::from_iter(vec![
            ("type".to_string(), notam.notam_type.to_string().into()),
            ("archive".to_string(), notam.archive.into()),
        ]);
        if let Some(a) = notam.location() {
            properties.insert("location".to_string(), a.into());
        }

        let geometry = match &notam.geometry {
            Geometry::AreaPolygon(_) => notam.geometry.to_polygon().map(|p| (&p).into()),
            Geometry::Circle(circle) => {
                properties.insert("radius".to_string(), circle.radius.get::<meter>().into());
                Some((&circle.center).into())
            }
            Geometry::Point(point) => Some(point.into()),
        };

        Feature {
            id: Some(Id::String(notam.id.clone())),
            geometry,
            properties: Some(properties),
            ..Default::default()
        }
    }));

    fs_err::write(geojson_path, feature_collection.to_string()).expect("could not write .geojson");
}
