pub mod catalog;

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{CanopyError, Result};
use crate::geo::{AnalysisGrid, BoundingBox};
use ::geo::{BoundingRect, Contains, LineString, MultiPolygon, Point, Polygon, Rect};

pub use catalog::{RegionCatalog, StaticCatalog};

/// TOML shape of one boundary polygon: an exterior ring and optional holes,
/// vertices as `[x, y]` in the scenes' projected CRS.
#[derive(Serialize, Deserialize)]
struct PolygonRecord {
    exterior: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    holes: Vec<Vec<[f64; 2]>>,
}

impl From<&Polygon<f64>> for PolygonRecord {
    fn from(polygon: &Polygon<f64>) -> Self {
        let ring = |ls: &LineString<f64>| ls.coords().map(|c| [c.x, c.y]).collect();
        Self {
            exterior: ring(polygon.exterior()),
            holes: polygon.interiors().iter().map(ring).collect(),
        }
    }
}

impl From<PolygonRecord> for Polygon<f64> {
    fn from(record: PolygonRecord) -> Self {
        Polygon::new(
            LineString::from(record.exterior),
            record.holes.into_iter().map(LineString::from).collect(),
        )
    }
}

mod boundary_serde {
    use ::geo::MultiPolygon;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::PolygonRecord;

    pub fn serialize<S: Serializer>(boundary: &MultiPolygon<f64>, s: S) -> Result<S::Ok, S::Error> {
        let records: Vec<PolygonRecord> = boundary.iter().map(PolygonRecord::from).collect();
        records.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<MultiPolygon<f64>, D::Error> {
        let records = Vec::<PolygonRecord>::deserialize(d)?;
        Ok(MultiPolygon::new(records.into_iter().map(Into::into).collect()))
    }
}

/// A named boundary, possibly nested inside a parent region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// A point is inside the region if any polygon contains it.
    #[serde(with = "boundary_serde")]
    pub boundary: MultiPolygon<f64>,
}

impl Region {
    pub fn new(name: impl Into<String>, boundary: Vec<Polygon<f64>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            boundary: MultiPolygon::new(boundary),
        }
    }

    pub fn rectangle(name: impl Into<String>, bounds: BoundingBox) -> Self {
        let rect = Rect::new((bounds.min_x, bounds.min_y), (bounds.max_x, bounds.max_y));
        Self::new(name, vec![rect.to_polygon()])
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Interior containment; points on a polygon edge are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let point = Point::new(x, y);
        self.boundary.iter().any(|p| p.contains(&point))
    }

    /// Bounding box of all polygons, or `None` for an empty boundary.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.boundary
            .bounding_rect()
            .map(|r| BoundingBox::new(r.min().x, r.min().y, r.max().x, r.max().y))
    }

    /// Per-pixel membership on `grid`, tested at pixel centres.
    pub fn mask_for(&self, grid: &AnalysisGrid) -> Array2<bool> {
        let mut mask = Array2::from_elem(grid.dim(), false);
        let Some(bounds) = self.bounds() else {
            return mask;
        };
        let inside = |(row, col): (usize, usize), m: &mut bool| {
            let (x, y) = grid.transform.pixel_center(row, col);
            *m = bounds.contains(x, y) && self.contains(x, y);
        };
        if grid.height * grid.width >= PARALLEL_PIXEL_THRESHOLD {
            Zip::indexed(&mut mask).par_for_each(inside);
        } else {
            Zip::indexed(&mut mask).for_each(inside);
        }
        mask
    }
}

/// Resolve `name` by exact match.
pub fn boundary_for(regions: &[Region], name: &str) -> Result<Region> {
    regions
        .iter()
        .find(|r| r.name == name)
        .cloned()
        .ok_or_else(|| CanopyError::RegionNotFound(name.to_string()))
}

/// Sub-regions whose parent is `parent`, sorted by name.
///
/// Fails with `RegionNotFound` if the parent itself is not in the catalog.
pub fn partition(catalog: &dyn RegionCatalog, parent: &str) -> Result<Vec<Region>> {
    let regions = catalog.regions()?;
    boundary_for(&regions, parent)?;
    let mut children: Vec<Region> = regions
        .into_iter()
        .filter(|r| r.parent.as_deref() == Some(parent))
        .collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(children)
}

/// Look up a region (top-level or nested) in a catalog.
pub fn resolve(catalog: &dyn RegionCatalog, name: &str) -> Result<Region> {
    boundary_for(&catalog.regions()?, name)
}
