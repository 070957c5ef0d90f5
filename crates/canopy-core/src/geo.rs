use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in the raster's coordinate reference.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// True if the two boxes share any area or edge.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// North-up affine transform from pixel (row, col) to map coordinates.
///
/// `pixel_height` is negative for the usual top-down row order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Unit pixels with the origin at (0, 0) and rows increasing downwards.
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }

    /// Map coordinates of the centre of pixel (row, col).
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Pixel (row, col) containing the map coordinate, if it falls on the
    /// non-negative quadrant of the grid. Callers bound-check against the
    /// raster dimensions.
    pub fn pixel_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x - self.origin_x) / self.pixel_width).floor();
        let row = ((y - self.origin_y) / self.pixel_height).floor();
        if col < 0.0 || row < 0.0 || !col.is_finite() || !row.is_finite() {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Area covered by one pixel, in squared map units.
    pub fn pixel_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height).abs()
    }

    /// Extent of a grid with the given dimensions.
    pub fn bounds(&self, height: usize, width: usize) -> BoundingBox {
        let x0 = self.origin_x;
        let x1 = self.origin_x + width as f64 * self.pixel_width;
        let y0 = self.origin_y;
        let y1 = self.origin_y + height as f64 * self.pixel_height;
        BoundingBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Target grid every scene is resampled onto before compositing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisGrid {
    pub height: usize,
    pub width: usize,
    pub transform: GeoTransform,
}

impl AnalysisGrid {
    pub fn new(height: usize, width: usize, transform: GeoTransform) -> Self {
        Self {
            height,
            width,
            transform,
        }
    }

    /// North-up grid of square pixels covering `bounds`.
    pub fn covering(bounds: &BoundingBox, pixel_size: f64) -> Self {
        let width = (bounds.width() / pixel_size).ceil().max(1.0) as usize;
        let height = (bounds.height() / pixel_size).ceil().max(1.0) as usize;
        Self {
            height,
            width,
            transform: GeoTransform::new(bounds.min_x, bounds.max_y, pixel_size, -pixel_size),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.transform.bounds(self.height, self.width)
    }
}
