//! Voronoi cells built from a Delaunay triangulation.
//!
//! A site's cell is the intersection of the half-planes closer to it than to
//! each Delaunay neighbour, started from a frame larger than every input and
//! finally clipped to the boundary polygon.

use crate::measure::total_bounds;
use crate::models::{from_multi_polygon, Geometry};
use crate::overlay::polygonal;
use geo::BooleanOps;
use geoframe_core::error::{GeoframeError, Result};
use spade::{DelaunayTriangulation, Point2, Triangulation};

/// Keep the part of `ring` on the site's side of the bisector between
/// `site` and `neighbour`
fn clip_to_bisector(ring: &[[f64; 2]], site: [f64; 2], neighbour: [f64; 2]) -> Vec<[f64; 2]> {
    let normal = [neighbour[0] - site[0], neighbour[1] - site[1]];
    let mid = [(site[0] + neighbour[0]) / 2.0, (site[1] + neighbour[1]) / 2.0];
    let side = |p: [f64; 2]| (p[0] - mid[0]) * normal[0] + (p[1] - mid[1]) * normal[1];

    let mut clipped = Vec::with_capacity(ring.len() + 1);
    for (i, &current) in ring.iter().enumerate() {
        let next = ring[(i + 1) % ring.len()];
        let (dc, dn) = (side(current), side(next));
        if dc <= 0.0 {
            clipped.push(current);
        }
        if (dc <= 0.0) != (dn <= 0.0) {
            let t = dc / (dc - dn);
            clipped.push([current[0] + t * (next[0] - current[0]), current[1] + t * (next[1] - current[1])]);
        }
    }
    clipped
}

fn frame(bounds: [f64; 4]) -> Vec<[f64; 2]> {
    let [min_x, min_y, max_x, max_y] = bounds;
    let pad = (max_x - min_x).max(max_y - min_y) + 1.0;
    vec![
        [min_x - pad, min_y - pad],
        [max_x + pad, min_y - pad],
        [max_x + pad, max_y + pad],
        [min_x - pad, max_y + pad],
    ]
}

/// One cell per site, clipped to `boundary`.
///
/// Coincident sites share a cell. A cell that falls entirely outside the
/// boundary is `None`, as is every cell when the boundary is not polygonal.
pub fn voronoi_cells(sites: &[[f64; 2]], boundary: &Geometry) -> Result<Vec<Option<Geometry>>> {
    let Some(mask) = polygonal(boundary) else {
        return Ok(vec![None; sites.len()]);
    };
    let site_points: Vec<Geometry> = sites.iter().map(|[x, y]| Geometry::point(*x, *y)).collect();
    let Some(bounds) = total_bounds(site_points.iter().chain(std::iter::once(boundary))) else {
        return Ok(vec![None; sites.len()]);
    };
    let outer = frame(bounds);

    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    let handles = sites
        .iter()
        .enumerate()
        .map(|(idx, [x, y])| {
            triangulation.insert(Point2::new(*x, *y)).map_err(|e| GeoframeError::InvalidGeometry {
                feature_id: idx.to_string(),
                reason: format!("cannot triangulate site ({}, {}): {:?}", x, y, e),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cells = handles
        .into_iter()
        .map(|handle| {
            let vertex = triangulation.vertex(handle);
            let site = [vertex.position().x, vertex.position().y];
            let ring = vertex.out_edges().fold(outer.clone(), |ring, edge| {
                let to = edge.to().position();
                clip_to_bisector(&ring, site, [to.x, to.y])
            });
            if ring.len() < 3 {
                return None;
            }
            let cell = geo::Polygon::new(geo::LineString::from(ring), vec![]);
            from_multi_polygon(mask.intersection(&geo::MultiPolygon::new(vec![cell])))
        })
        .collect();

    tracing::debug!("Built {} Voronoi cells from {} vertices", sites.len(), triangulation.num_vertices());
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::area;
    use crate::models::to_geo_geometry;
    use crate::spatial::covered_by;

    fn square() -> Geometry {
        Geometry::rect([0.0, 0.0], [100.0, 100.0])
    }

    fn covers(cell: &Geometry, [x, y]: [f64; 2]) -> bool {
        covered_by(&geo::Geometry::Point(geo::Point::new(x, y)), &to_geo_geometry(cell))
    }

    #[test]
    fn test_two_sites_split_at_bisector() {
        let cells = voronoi_cells(&[[25.0, 50.0], [75.0, 50.0]], &square()).unwrap();
        let left = cells[0].as_ref().unwrap();
        let right = cells[1].as_ref().unwrap();

        assert!((area(left) - 5000.0).abs() < 1e-3);
        assert!((area(right) - 5000.0).abs() < 1e-3);
        assert!(covers(left, [49.0, 1.0]));
        assert!(covers(left, [10.0, 90.0]));
        assert!(!covers(left, [51.0, 50.0]));
        assert!(covers(right, [51.0, 50.0]));
    }

    #[test]
    fn test_cells_tile_the_boundary() {
        let sites = [[10.0, 10.0], [80.0, 20.0], [50.0, 70.0], [20.0, 90.0], [90.0, 90.0]];
        let cells = voronoi_cells(&sites, &square()).unwrap();

        assert_eq!(cells.len(), sites.len());
        let total: f64 = cells.iter().flatten().map(area).sum();
        assert!((total - 10_000.0).abs() < 1e-3);
        for (cell, site) in cells.iter().zip(sites) {
            assert!(covers(cell.as_ref().unwrap(), site));
        }
    }

    #[test]
    fn test_collinear_and_single_sites() {
        let cells = voronoi_cells(&[[10.0, 50.0], [50.0, 50.0], [90.0, 50.0]], &square()).unwrap();
        assert!((area(cells[1].as_ref().unwrap()) - 4000.0).abs() < 1e-3);

        let single = voronoi_cells(&[[30.0, 30.0]], &square()).unwrap();
        assert!((area(single[0].as_ref().unwrap()) - 10_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_coincident_sites_share_a_cell() {
        let cells = voronoi_cells(&[[20.0, 50.0], [80.0, 50.0], [20.0, 50.0]], &square()).unwrap();
        assert_eq!(cells[0], cells[2]);
        assert!((area(cells[0].as_ref().unwrap()) - 5000.0).abs() < 1e-3);
    }

    #[test]
    fn test_site_outside_boundary() {
        let cells = voronoi_cells(&[[50.0, 50.0], [500.0, 50.0]], &square()).unwrap();
        assert!((area(cells[0].as_ref().unwrap()) - 10_000.0).abs() < 1e-3);
        assert!(cells[1].is_none());
    }

    #[test]
    fn test_non_polygonal_boundary() {
        let line = Geometry::line_string(vec![[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(voronoi_cells(&[[0.5, 0.5]], &line).unwrap(), vec![None]);
    }
}
