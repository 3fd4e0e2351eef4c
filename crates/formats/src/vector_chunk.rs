use foundation::math::LonLat;
use serde_json::{Map, Value};

/// Areal geometry of a boundary feature, in GeoJSON ring order (outer ring first).
#[derive(Debug, Clone, PartialEq)]
pub enum VectorGeometry {
    Polygon(Vec<Vec<LonLat>>),
    MultiPolygon(Vec<Vec<Vec<LonLat>>>),
}

impl VectorGeometry {
    /// Polygons as lists of rings (outer ring first).
    pub fn polygons(&self) -> Vec<&[Vec<LonLat>]> {
        match self {
            VectorGeometry::Polygon(rings) => vec![rings.as_slice()],
            VectorGeometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` for `null` geometry and for point or line geometry, which
    /// carry no area to fill.
    pub geometry: Option<VectorGeometry>,
}

impl VectorFeature {
    /// String value of a property; numbers are stringified.
    pub fn property_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A parsed GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorChunk {
    pub features: Vec<VectorFeature>,
}

#[derive(Debug)]
pub enum VectorChunkError {
    Json(String),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for VectorChunkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorChunkError::Json(e) => write!(f, "JSON parse error: {e}"),
            VectorChunkError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            VectorChunkError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for VectorChunkError {}

impl VectorChunk {
    pub fn from_geojson_str(payload: &str) -> Result<Self, VectorChunkError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| VectorChunkError::Json(e.to_string()))?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, VectorChunkError> {
        let features = match &value {
            Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("FeatureCollection") => {
                obj.get("features").and_then(Value::as_array)
            }
            _ => None,
        }
        .ok_or(VectorChunkError::NotAFeatureCollection)?;

        let features = features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                parse_feature(feature)
                    .map_err(|reason| VectorChunkError::InvalidFeature { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { features })
    }
}

fn parse_feature(value: &Value) -> Result<VectorFeature, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let geometry = match obj.get("geometry").ok_or("feature missing geometry")? {
        Value::Null => None,
        g => parse_geometry(g)?,
    };

    Ok(VectorFeature {
        id,
        properties,
        geometry,
    })
}

fn parse_geometry(value: &Value) -> Result<Option<VectorGeometry>, String> {
    let obj = value.as_object().ok_or("geometry must be an object")?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type")?;
    let coords = || obj.get("coordinates").ok_or("geometry missing coordinates");

    Ok(match ty {
        "Polygon" => Some(VectorGeometry::Polygon(rings(coords()?)?)),
        "MultiPolygon" => Some(VectorGeometry::MultiPolygon(
            array(coords()?, "MultiPolygon coordinates must be an array of polygons")?
                .iter()
                .map(rings)
                .collect::<Result<Vec<_>, String>>()?,
        )),
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "GeometryCollection" => None,
        other => return Err(format!("unsupported geometry type: {other}")),
    })
}

fn array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, String> {
    value.as_array().ok_or_else(|| what.to_string())
}

fn rings(value: &Value) -> Result<Vec<Vec<LonLat>>, String> {
    array(value, "coordinates must be an array of rings")?
        .iter()
        .map(|ring| -> Result<Vec<LonLat>, String> {
            array(ring, "ring must be an array of positions")?
                .iter()
                .map(position)
                .collect()
        })
        .collect()
}

fn position(value: &Value) -> Result<LonLat, String> {
    match array(value, "position must be an array")?.as_slice() {
        [lon, lat, ..] => Ok(LonLat::new(
            lon.as_f64().ok_or("lon must be a number")?,
            lat.as_f64().ok_or("lat must be a number")?,
        )),
        _ => Err("position must have [lon, lat]".to_string()),
    }
}
