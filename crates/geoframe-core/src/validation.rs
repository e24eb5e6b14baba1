use crate::error::{GeoframeError, Result};
use crate::models::{Feature, FeatureCollection, Geometry, ValidityMode};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    fn absorb(&mut self, prefix: &str, other: ValidationResult) {
        for error in other.errors {
            self.add_error(format!("{}.{}", prefix, error.location), error.reason);
        }
    }

    /// First error reason, for single-line reporting
    pub fn first_reason(&self) -> String {
        self.errors
            .first()
            .map(|e| format!("{}: {}", e.location, e.reason))
            .unwrap_or_else(|| "invalid geometry".to_string())
    }
}

/// Validate a geometry's structure
pub fn validate_geometry(geometry: &Geometry) -> ValidationResult {
    match geometry {
        Geometry::Point { coordinates } => validate_coords("Point", std::slice::from_ref(coordinates)),
        Geometry::LineString { coordinates } => validate_line("LineString", coordinates),
        Geometry::Polygon { coordinates } => validate_polygon("Polygon", coordinates),
        Geometry::MultiPoint { coordinates } => validate_coords("MultiPoint", coordinates),
        Geometry::MultiLineString { coordinates } => {
            let mut result = ValidationResult::valid();
            for (i, line) in coordinates.iter().enumerate() {
                result.absorb(&format!("MultiLineString[{}]", i), validate_line("LineString", line));
            }
            result
        }
        Geometry::MultiPolygon { coordinates } => {
            let mut result = ValidationResult::valid();
            for (i, rings) in coordinates.iter().enumerate() {
                result.absorb(&format!("MultiPolygon[{}]", i), validate_polygon("Polygon", rings));
            }
            result
        }
        Geometry::GeometryCollection { geometries } => {
            let mut result = ValidationResult::valid();
            for (i, g) in geometries.iter().enumerate() {
                result.absorb(&format!("GeometryCollection[{}]", i), validate_geometry(g));
            }
            result
        }
    }
}

fn validate_coords(location: &str, coords: &[[f64; 2]]) -> ValidationResult {
    let mut result = ValidationResult::valid();
    for (i, [x, y]) in coords.iter().enumerate() {
        if !x.is_finite() || !y.is_finite() {
            result.add_error(format!("{}[{}]", location, i), "Coordinates must be finite".to_string());
        }
    }
    result
}

fn validate_line(location: &str, coords: &[[f64; 2]]) -> ValidationResult {
    if coords.len() < 2 {
        let mut result = ValidationResult::valid();
        result.add_error(
            location.to_string(),
            format!("LineString must have at least 2 points, found {}", coords.len()),
        );
        return result;
    }
    validate_coords(location, coords)
}

fn validate_polygon(location: &str, rings: &[Vec<[f64; 2]>]) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if rings.is_empty() {
        result.add_error(location.to_string(), "Polygon must have an exterior ring".to_string());
        return result;
    }

    for (i, ring) in rings.iter().enumerate() {
        let ring_location =
            if i == 0 { format!("{} exterior", location) } else { format!("{} interior[{}]", location, i - 1) };

        if ring.len() < 4 {
            result.add_error(
                ring_location.clone(),
                format!("Ring must have at least 4 points, found {}", ring.len()),
            );
        }
        if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
            if first != last {
                result.add_error(
                    ring_location.clone(),
                    "Ring must be closed (first point == last point)".to_string(),
                );
            }
        }
        result.absorb(&ring_location, validate_coords("coord", ring));
    }

    result
}

/// Apply the validity policy to a freshly loaded collection.
///
/// Strict mode fails on the first invalid geometry. Lenient mode replaces
/// invalid geometries with null and logs each one.
pub fn apply_validity(collection: FeatureCollection, mode: ValidityMode) -> Result<FeatureCollection> {
    let (crs, schema, features) = collection.into_parts();
    let mut dropped = 0usize;

    let features = features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| {
            let Some(geometry) = &feature.geometry else {
                return Ok(feature);
            };
            let validation = validate_geometry(geometry);
            if validation.is_valid {
                return Ok(feature);
            }
            match mode {
                ValidityMode::Strict => Err(GeoframeError::InvalidGeometry {
                    feature_id: idx.to_string(),
                    reason: validation.first_reason(),
                }),
                ValidityMode::Lenient => {
                    tracing::warn!(
                        "Dropping invalid geometry of feature {}: {}",
                        idx,
                        validation.first_reason()
                    );
                    dropped += 1;
                    Ok(Feature::without_geometry(feature.attributes))
                }
            }
        })
        .collect::<Result<Vec<_>>>()?;

    if dropped > 0 {
        tracing::debug!("{} invalid geometries set to null", dropped);
    }

    FeatureCollection::new(crs, schema, features)
}

/// Count invalid geometries in a collection
pub fn count_invalid_geometries(collection: &FeatureCollection) -> usize {
    collection.geometries().flatten().filter(|g| !validate_geometry(g).is_valid).count()
}
