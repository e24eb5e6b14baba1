use crate::measure::bounds;
use crate::models::Geometry;
use rstar::{RTree, RTreeObject, AABB};

/// Row position paired with the bounding box of its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedGeometry {
    /// Position of the row in its collection
    pub id: usize,

    envelope: AABB<[f64; 2]>,
}

impl IndexedGeometry {
    /// Index entry for a geometry, None when it has no extent to index
    pub fn new(id: usize, geometry: &Geometry) -> Option<Self> {
        let [minx, miny, maxx, maxy] = bounds(geometry)?;
        Some(Self { id, envelope: AABB::from_corners([minx, miny], [maxx, maxy]) })
    }
}

impl RTreeObject for IndexedGeometry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over the envelopes of one side of a spatial join.
///
/// Queries return candidate row ids whose envelopes intersect the query box;
/// callers still evaluate the exact predicate on each candidate.
pub struct SpatialIndex {
    tree: RTree<IndexedGeometry>,
}

impl SpatialIndex {
    /// Bulk-load an index. Missing and empty geometries are skipped.
    pub fn from_geometries<'a>(
        geometries: impl IntoIterator<Item = (usize, Option<&'a Geometry>)>,
    ) -> Self {
        let indexed: Vec<IndexedGeometry> = geometries
            .into_iter()
            .filter_map(|(id, geom)| geom.and_then(|g| IndexedGeometry::new(id, g)))
            .collect();

        Self { tree: RTree::bulk_load(indexed) }
    }

    /// Ids whose envelopes intersect a bounding box, in ascending order
    pub fn query_bbox(&self, min: [f64; 2], max: [f64; 2]) -> Vec<usize> {
        let bbox = AABB::from_corners(min, max);
        let mut ids: Vec<usize> =
            self.tree.locate_in_envelope_intersecting(&bbox).map(|g| g.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Candidates for a geometry, with its envelope grown by `margin`
    pub fn query_expanded(&self, geometry: &Geometry, margin: f64) -> Vec<usize> {
        match bounds(geometry) {
            Some([minx, miny, maxx, maxy]) => {
                self.query_bbox([minx - margin, miny - margin], [maxx + margin, maxy + margin])
            }
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
