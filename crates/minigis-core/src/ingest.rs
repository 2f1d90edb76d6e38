//! GeoJSON ingestion into layers.

use crate::error::{MapError, MapResult};
use crate::geometry::{Coordinate, Geometry, Line, Point, Polygon};
use crate::layer::Layer;
use geojson::{FeatureCollection, GeoJson, Position};

/// Build a layer from every supported geometry in a feature collection.
///
/// MultiLineStrings and MultiPolygons are flattened into sibling lines and
/// polygons. Unsupported or malformed geometries are skipped with a warning.
pub fn layer_from_feature_collection(collection: &FeatureCollection, name: &str) -> Layer {
    let mut layer = Layer::new(name);
    for (index, feature) in collection.features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            log::warn!("feature {index} has no geometry, skipping");
            continue;
        };
        for converted in convert(&geometry.value, index) {
            layer.add_geometry(converted);
        }
    }
    log::debug!("ingested {} geometries into layer '{name}'", layer.len());
    layer
}

/// Parse a GeoJSON document and build a layer from it.
///
/// The document must be a FeatureCollection.
pub fn layer_from_str(json: &str, name: &str) -> MapResult<Layer> {
    let geojson: GeoJson = json.parse().map_err(|e: geojson::Error| MapError::Ingest(e.to_string()))?;
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(layer_from_feature_collection(&collection, name)),
        GeoJson::Feature(_) => Err(MapError::Ingest("expected a FeatureCollection, got a Feature".to_string())),
        GeoJson::Geometry(_) => Err(MapError::Ingest("expected a FeatureCollection, got a Geometry".to_string())),
    }
}

fn convert(value: &geojson::Value, index: usize) -> Vec<Geometry> {
    let result = match value {
        geojson::Value::Point(position) => point(position).map(|p| vec![p]),
        geojson::Value::LineString(line) => line_string(line).map(|l| vec![l]),
        geojson::Value::Polygon(rings) => polygon(rings).map(|p| vec![p]),
        geojson::Value::MultiLineString(lines) => lines.iter().map(|l| line_string(l)).collect(),
        geojson::Value::MultiPolygon(polygons) => polygons.iter().map(|p| polygon(p)).collect(),
        geojson::Value::MultiPoint(_) => Err(MapError::Ingest("unsupported geometry type MultiPoint".to_string())),
        geojson::Value::GeometryCollection(_) => {
            Err(MapError::Ingest("unsupported geometry type GeometryCollection".to_string()))
        }
    };
    result.unwrap_or_else(|e| {
        log::warn!("feature {index} skipped: {e}");
        Vec::new()
    })
}

fn coordinate(position: &Position) -> MapResult<Coordinate> {
    match position.as_slice() {
        [x, y, ..] => Ok(Coordinate::new(*x, *y)),
        _ => Err(MapError::Ingest(format!("position needs 2 ordinates, got {}", position.len()))),
    }
}

fn ring(positions: &[Position]) -> MapResult<Vec<Coordinate>> {
    positions.iter().map(coordinate).collect()
}

fn point(position: &Position) -> MapResult<Geometry> {
    Ok(Point::new(coordinate(position)?).into())
}

fn line_string(positions: &[Position]) -> MapResult<Geometry> {
    Ok(Line::new(ring(positions)?)?.into())
}

fn polygon(rings: &[Vec<Position>]) -> MapResult<Geometry> {
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| MapError::Ingest("polygon has no rings".to_string()))?;
    let holes = holes.iter().map(|h| ring(h)).collect::<MapResult<Vec<_>>>()?;
    Ok(Polygon::new(ring(exterior)?)?.with_holes(holes).into())
}
