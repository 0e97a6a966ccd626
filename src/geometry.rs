//! Volume primitives and containment / intersection predicates.
//!
//! Everything here is a pure function over integer coordinates. Boundary
//! points (exactly on a face or edge) are INSIDE, so a block on the shared
//! face of two adjacent regions belongs to both.

use crate::error::{RegionError, Result};
use crate::types::BlockPos;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Bounding box
// ---------------------------------------------------------------------------

/// Axis-aligned box used for coarse filtering in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BoundingBox {
    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

/// A bounded region volume.
///
/// Constructed only through [`Volume::cuboid`] and [`Volume::polygon`],
/// which normalise corners and reject degenerate geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Volume {
    /// Axis-aligned cuboid, inclusive on every face.
    Cuboid { min: BlockPos, max: BlockPos },
    /// Horizontal polygon extruded between two inclusive vertical bounds.
    ///
    /// Vertices are (x, z) pairs in order; the closing edge back to the
    /// first vertex is implicit.
    Polygon {
        vertices: Vec<(i32, i32)>,
        y_min: i32,
        y_max: i32,
    },
}

impl Volume {
    /// Build a cuboid from two arbitrary opposite corners (auto-sorted).
    pub fn cuboid(a: BlockPos, b: BlockPos) -> Volume {
        Volume::Cuboid {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Build a vertically bounded polygon.
    ///
    /// Fails with [`RegionError::InvalidVolume`] when the outline has fewer
    /// than three vertices, has zero area, self-intersects, or the vertical
    /// bounds are inverted.
    pub fn polygon(vertices: Vec<(i32, i32)>, y_min: i32, y_max: i32) -> Result<Volume> {
        if vertices.len() < 3 {
            return Err(RegionError::InvalidVolume(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if y_min > y_max {
            return Err(RegionError::InvalidVolume(format!(
                "inverted vertical bounds: y_min {y_min} > y_max {y_max}"
            )));
        }
        if polygon_area_doubled(&vertices) == 0 {
            return Err(RegionError::InvalidVolume(
                "polygon outline has zero area".into(),
            ));
        }
        if polygon_self_intersects(&vertices) {
            return Err(RegionError::InvalidVolume(
                "polygon outline is self-intersecting".into(),
            ));
        }
        Ok(Volume::Polygon {
            vertices,
            y_min,
            y_max,
        })
    }

    /// Validate a volume that arrived pre-built (e.g. from a snapshot).
    pub fn validate(&self) -> Result<()> {
        match self {
            Volume::Cuboid { min, max } => {
                if min.x > max.x || min.y > max.y || min.z > max.z {
                    return Err(RegionError::InvalidVolume(format!(
                        "cuboid corners not normalised: min {min} max {max}"
                    )));
                }
                Ok(())
            }
            Volume::Polygon {
                vertices,
                y_min,
                y_max,
            } => {
                Volume::polygon(vertices.clone(), *y_min, *y_max)?;
                Ok(())
            }
        }
    }

    /// Exact containment test, inclusive of boundaries.
    pub fn contains(&self, pos: BlockPos) -> bool {
        match self {
            Volume::Cuboid { min, max } => {
                pos.x >= min.x
                    && pos.x <= max.x
                    && pos.y >= min.y
                    && pos.y <= max.y
                    && pos.z >= min.z
                    && pos.z <= max.z
            }
            Volume::Polygon {
                vertices,
                y_min,
                y_max,
            } => {
                pos.y >= *y_min
                    && pos.y <= *y_max
                    && point_in_polygon((pos.x, pos.z), vertices)
            }
        }
    }

    /// Coarse test: do the two volumes share at least one block?
    ///
    /// Exact for cuboid/cuboid; polygon pairs use an exact outline test
    /// (vertex containment either way, or any crossing edge pair).
    pub fn intersects(&self, other: &Volume) -> bool {
        if !self.bounding_box().overlaps(&other.bounding_box()) {
            return false;
        }
        match (self, other) {
            (Volume::Cuboid { .. }, Volume::Cuboid { .. }) => true, // bbox is exact
            _ => {
                let a = self.footprint();
                let b = other.footprint();
                footprints_intersect(&a, &b)
            }
        }
    }

    /// Axis-aligned bounding box, used by the index for coarse filtering.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Volume::Cuboid { min, max } => BoundingBox {
                min: *min,
                max: *max,
            },
            Volume::Polygon {
                vertices,
                y_min,
                y_max,
            } => {
                let mut min_x = i32::MAX;
                let mut max_x = i32::MIN;
                let mut min_z = i32::MAX;
                let mut max_z = i32::MIN;
                for &(x, z) in vertices {
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    min_z = min_z.min(z);
                    max_z = max_z.max(z);
                }
                BoundingBox {
                    min: BlockPos::new(min_x, *y_min, min_z),
                    max: BlockPos::new(max_x, *y_max, max_z),
                }
            }
        }
    }

    /// Horizontal outline as an ordered vertex list.
    fn footprint(&self) -> Vec<(i32, i32)> {
        match self {
            Volume::Cuboid { min, max } => vec![
                (min.x, min.z),
                (max.x, min.z),
                (max.x, max.z),
                (min.x, max.z),
            ],
            Volume::Polygon { vertices, .. } => vertices.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Point-in-polygon (even-odd ray cast, boundary-inclusive, integer-exact)
// ---------------------------------------------------------------------------

/// Even-odd ray-casting containment with an explicit on-edge pre-check so
/// boundary points count as inside.
fn point_in_polygon(p: (i32, i32), vertices: &[(i32, i32)]) -> bool {
    let n = vertices.len();

    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        if on_segment(p, a, b) {
            return true;
        }
    }

    // Even-odd crossing count against a ray toward +x. All comparisons are
    // cross-multiplied in i64 so there is no rounding anywhere.
    let (px, pz) = (i64::from(p.0), i64::from(p.1));
    let mut inside = false;
    for i in 0..n {
        let (xi, zi) = (i64::from(vertices[i].0), i64::from(vertices[i].1));
        let j = (i + 1) % n;
        let (xj, zj) = (i64::from(vertices[j].0), i64::from(vertices[j].1));

        if (zi > pz) == (zj > pz) {
            continue; // edge does not straddle the ray's z
        }
        let dz = zj - zi;
        let lhs = (px - xi) * dz;
        let rhs = (xj - xi) * (pz - zi);
        let crosses = if dz > 0 { lhs < rhs } else { lhs > rhs };
        if crosses {
            inside = !inside;
        }
    }
    inside
}

/// True when `p` lies exactly on the closed segment a→b.
fn on_segment(p: (i32, i32), a: (i32, i32), b: (i32, i32)) -> bool {
    if orientation(a, b, p) != 0 {
        return false;
    }
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

/// Sign of the cross product (b - a) × (c - a): 0 collinear, >0 ccw, <0 cw.
fn orientation(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> i64 {
    let v = (i64::from(b.0) - i64::from(a.0)) * (i64::from(c.1) - i64::from(a.1))
        - (i64::from(b.1) - i64::from(a.1)) * (i64::from(c.0) - i64::from(a.0));
    v.signum()
}

/// Closed-segment intersection test (shared endpoints count).
fn segments_intersect(a: (i32, i32), b: (i32, i32), c: (i32, i32), d: (i32, i32)) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    if o1 != o2 && o3 != o4 {
        return true;
    }
    (o1 == 0 && on_segment(c, a, b))
        || (o2 == 0 && on_segment(d, a, b))
        || (o3 == 0 && on_segment(a, c, d))
        || (o4 == 0 && on_segment(b, c, d))
}

/// Twice the signed shoelace area; zero means a fully collinear outline.
fn polygon_area_doubled(vertices: &[(i32, i32)]) -> i64 {
    let n = vertices.len();
    let mut sum: i64 = 0;
    for i in 0..n {
        let (xi, zi) = (i64::from(vertices[i].0), i64::from(vertices[i].1));
        let j = (i + 1) % n;
        let (xj, zj) = (i64::from(vertices[j].0), i64::from(vertices[j].1));
        sum += xi * zj - xj * zi;
    }
    sum
}

/// Pairwise edge test skipping adjacent edges (which always touch at the
/// shared vertex).
fn polygon_self_intersects(vertices: &[(i32, i32)]) -> bool {
    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        for j in (i + 1)..n {
            // Skip the edge itself and the two neighbours sharing a vertex.
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let c = vertices[j];
            let d = vertices[(j + 1) % n];
            if segments_intersect(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

/// Exact outline intersection: either outline contains a vertex of the
/// other, or some edge pair crosses.
fn footprints_intersect(a: &[(i32, i32)], b: &[(i32, i32)]) -> bool {
    if a.iter().any(|&v| point_in_polygon(v, b)) {
        return true;
    }
    if b.iter().any(|&v| point_in_polygon(v, a)) {
        return true;
    }
    let na = a.len();
    let nb = b.len();
    for i in 0..na {
        for j in 0..nb {
            if segments_intersect(a[i], a[(i + 1) % na], b[j], b[(j + 1) % nb]) {
                return true;
            }
        }
    }
    false
}
