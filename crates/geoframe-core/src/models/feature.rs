use serde::{Deserialize, Serialize};

use super::geometry::{Crs, Geometry};
use super::schema::Schema;
use super::table::{checked_fill, project_schema, Row, Table, Tabular};
use super::value::Value;
use crate::error::{GeoframeError, Result};

/// Spatial feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Geometry. None for rows that carry no location, e.g. the right-only
    /// rows of an outer attribute join.
    pub geometry: Option<Geometry>,

    /// Attribute values aligned with the collection's schema
    pub attributes: Row,
}

impl Feature {
    pub fn new(geometry: Geometry, attributes: Row) -> Self {
        Self { geometry: Some(geometry), attributes }
    }

    pub fn without_geometry(attributes: Row) -> Self {
        Self { geometry: None, attributes }
    }

    /// Check if this feature has a usable geometry
    pub fn has_geometry(&self) -> bool {
        self.geometry.as_ref().map(|g| !g.is_empty()).unwrap_or(false)
    }
}

/// Ordered features sharing one CRS tag and one attribute schema.
///
/// The CRS is an explicit `Option`: a collection loaded from a source without
/// CRS metadata stays untagged until the caller sets one, and spatial
/// operations reject untagged input instead of assuming WGS 84.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    crs: Option<Crs>,
    schema: Schema,
    features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a collection, checking every feature's attributes against the schema
    pub fn new(crs: Option<Crs>, schema: Schema, features: Vec<Feature>) -> Result<Self> {
        let features = features
            .into_iter()
            .map(|f| {
                Ok(Feature { geometry: f.geometry, attributes: schema.conform(f.attributes)? })
            })
            .collect::<Result<_>>()?;
        Ok(Self { crs, schema, features })
    }

    pub fn empty(crs: Option<Crs>, schema: Schema) -> Self {
        Self { crs, schema, features: Vec::new() }
    }

    /// Attach point geometries built from two coordinate columns.
    ///
    /// Rows where either coordinate is null or non-numeric get no geometry.
    /// The coordinate columns stay in the attribute table.
    pub fn from_xy(table: &Table, x: &str, y: &str, crs: Crs) -> Result<Self> {
        let x_idx = table.schema().require(x)?;
        let y_idx = table.schema().require(y)?;

        for idx in [x_idx, y_idx] {
            let column = table.schema().column(idx);
            if !column.dtype.is_numeric() {
                return Err(GeoframeError::TypeMismatch {
                    column: column.name.clone(),
                    expected: "int or float".to_string(),
                    found: column.dtype.to_string(),
                });
            }
        }

        let features = table
            .rows()
            .iter()
            .map(|row| {
                let geometry = match (row[x_idx].as_f64(), row[y_idx].as_f64()) {
                    (Some(x), Some(y)) => Some(Geometry::point(x, y)),
                    _ => None,
                };
                Feature { geometry, attributes: row.clone() }
            })
            .collect();

        Ok(Self { crs: Some(crs), schema: table.schema().clone(), features })
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// The CRS, failing when the collection is untagged
    pub fn require_crs(&self, operation: &str) -> Result<&Crs> {
        self.crs.as_ref().ok_or_else(|| GeoframeError::MissingCrs {
            operation: operation.to_string(),
        })
    }

    /// Tag an untagged collection. Coordinates are not transformed.
    ///
    /// Fails if the collection already carries a different tag; use
    /// [`override_crs`](Self::override_crs) to replace it deliberately.
    pub fn set_crs(self, crs: Crs) -> Result<Self> {
        match &self.crs {
            Some(existing) if existing.epsg != crs.epsg => Err(GeoframeError::CrsMismatch {
                left: existing.to_string(),
                right: crs.to_string(),
            }),
            _ => Ok(Self { crs: Some(crs), ..self }),
        }
    }

    /// Replace the tag without transforming coordinates
    pub fn override_crs(self, crs: Crs) -> Self {
        Self { crs: Some(crs), ..self }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn geometries(&self) -> impl Iterator<Item = Option<&Geometry>> {
        self.features.iter().map(|f| f.geometry.as_ref())
    }

    pub fn into_parts(self) -> (Option<Crs>, Schema, Vec<Feature>) {
        (self.crs, self.schema, self.features)
    }

    /// Drop the geometry, keeping the attributes
    pub fn to_table(&self) -> Table {
        let rows = self.features.iter().map(|f| f.attributes.clone()).collect();
        // rows already conform to the schema
        Table::new(self.schema.clone(), rows).unwrap_or_else(|_| Table::empty(self.schema.clone()))
    }

    /// Keep only the named columns; geometry is kept
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let (schema, indices) = project_schema(&self.schema, columns)?;
        let features = self
            .features
            .iter()
            .map(|f| Feature {
                geometry: f.geometry.clone(),
                attributes: indices.iter().map(|&i| f.attributes[i].clone()).collect(),
            })
            .collect();
        Ok(Self { crs: self.crs.clone(), schema, features })
    }

    /// Keep features for which the predicate holds
    pub fn filter(&self, mut predicate: impl FnMut(&Schema, &Feature) -> bool) -> Self {
        let features =
            self.features.iter().filter(|f| predicate(&self.schema, f)).cloned().collect();
        Self { crs: self.crs.clone(), schema: self.schema.clone(), features }
    }

    /// Keep features at the given positions, in order
    pub fn take(&self, indices: &[usize]) -> Self {
        let features = indices.iter().filter_map(|&i| self.features.get(i)).cloned().collect();
        Self { crs: self.crs.clone(), schema: self.schema.clone(), features }
    }

    /// Replace nulls in one column
    pub fn fill_null(&self, column: &str, fill: Value) -> Result<Self> {
        let col = self.schema.require(column)?;
        let fill = checked_fill(self.schema.column(col), fill)?;
        let features = self
            .features
            .iter()
            .map(|f| {
                let mut f = f.clone();
                if f.attributes[col].is_null() {
                    f.attributes[col] = fill.clone();
                }
                f
            })
            .collect();
        Ok(Self { crs: self.crs.clone(), schema: self.schema.clone(), features })
    }

    /// Same attributes and CRS with new geometries, one per feature
    pub fn with_geometries(&self, geometries: Vec<Option<Geometry>>) -> Result<Self> {
        if geometries.len() != self.features.len() {
            return Err(GeoframeError::InvalidGeometry {
                feature_id: "<collection>".to_string(),
                reason: format!(
                    "expected {} geometries, found {}",
                    self.features.len(),
                    geometries.len()
                ),
            });
        }
        let features = self
            .features
            .iter()
            .zip(geometries)
            .map(|(f, geometry)| Feature { geometry, attributes: f.attributes.clone() })
            .collect();
        Ok(Self { crs: self.crs.clone(), schema: self.schema.clone(), features })
    }
}

impl Tabular for FeatureCollection {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn row(&self, idx: usize) -> &Row {
        &self.features[idx].attributes
    }

    fn len(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::ColumnType;

    fn schools() -> Table {
        let schema = Schema::of(&[
            ("Site", ColumnType::Text),
            ("X", ColumnType::Float),
            ("Y", ColumnType::Float),
        ])
        .unwrap();
        Table::new(
            schema,
            vec![
                vec!["Oak".into(), Value::Float(-122.27), Value::Float(37.80)],
                vec!["Elm".into(), Value::Null, Value::Float(37.81)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_xy() {
        let fc = FeatureCollection::from_xy(&schools(), "X", "Y", Crs::wgs84()).unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.crs().unwrap().epsg, 4326);
        assert_eq!(fc.features()[0].geometry, Some(Geometry::point(-122.27, 37.80)));
        assert!(fc.features()[1].geometry.is_none());
    }

    #[test]
    fn test_from_xy_requires_numeric_columns() {
        let result = FeatureCollection::from_xy(&schools(), "Site", "Y", Crs::wgs84());
        assert!(matches!(result, Err(GeoframeError::TypeMismatch { .. })));
        let result = FeatureCollection::from_xy(&schools(), "lon", "Y", Crs::wgs84());
        assert!(matches!(result, Err(GeoframeError::Schema { .. })));
    }

    #[test]
    fn test_untagged_collection_requires_crs() {
        let fc = FeatureCollection::empty(None, Schema::default());
        assert!(matches!(fc.require_crs("buffer"), Err(GeoframeError::MissingCrs { .. })));

        let tagged = fc.set_crs(Crs::from_epsg(26910)).unwrap();
        assert_eq!(tagged.require_crs("buffer").unwrap().epsg, 26910);
    }

    #[test]
    fn test_set_crs_refuses_silent_retag() {
        let fc = FeatureCollection::empty(Some(Crs::wgs84()), Schema::default());
        assert!(fc.clone().set_crs(Crs::wgs84()).is_ok());
        assert!(fc.clone().set_crs(Crs::web_mercator()).is_err());
        assert_eq!(fc.override_crs(Crs::web_mercator()).crs().unwrap().epsg, 3857);
    }

    #[test]
    fn test_select_keeps_geometry() {
        let fc = FeatureCollection::from_xy(&schools(), "X", "Y", Crs::wgs84()).unwrap();
        let selected = fc.select(&["Site"]).unwrap();
        assert_eq!(selected.schema().len(), 1);
        assert!(selected.features()[0].geometry.is_some());
    }

    #[test]
    fn test_has_geometry() {
        assert!(Feature::new(Geometry::point(1.0, 2.0), vec![]).has_geometry());
        assert!(!Feature::new(Geometry::line_string(vec![]), vec![]).has_geometry());
        assert!(!Feature::without_geometry(vec![]).has_geometry());
    }
}
