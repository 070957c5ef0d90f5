use ndarray::{Array2, Zip};

use crate::error::{CanopyError, Result};
use crate::geo::{AnalysisGrid, GeoTransform};

/// A single named band. Values at invalid pixels are meaningless.
#[derive(Clone, Debug)]
pub struct Band {
    pub name: String,
    pub data: Array2<f32>,
}

/// Multi-band grid with a shared per-pixel validity mask.
///
/// All bands and the validity grid have identical dimensions, shape =
/// (height, width), row-major. Aggregates must skip pixels whose validity
/// flag is false.
#[derive(Clone, Debug)]
pub struct Raster {
    bands: Vec<Band>,
    valid: Array2<bool>,
    /// Pixel-to-map transform. Passed through untouched by every stage.
    pub transform: GeoTransform,
    /// Coordinate reference label (e.g. "EPSG:32722"), carried but never interpreted.
    pub crs: Option<String>,
}

impl Raster {
    /// Raster with no bands whose validity grid is `valid`.
    pub fn new(valid: Array2<bool>, transform: GeoTransform) -> Self {
        Self {
            bands: Vec::new(),
            valid,
            transform,
            crs: None,
        }
    }

    /// All-valid raster with no bands.
    pub fn all_valid(height: usize, width: usize, transform: GeoTransform) -> Self {
        Self::new(Array2::from_elem((height, width), true), transform)
    }

    /// Fully invalid raster on `grid` carrying zero-filled bands with the given names.
    pub fn no_data(grid: &AnalysisGrid, band_names: &[&str]) -> Self {
        let mut raster = Self::new(Array2::from_elem(grid.dim(), false), grid.transform);
        for name in band_names {
            raster.bands.push(Band {
                name: (*name).to_string(),
                data: Array2::zeros(grid.dim()),
            });
        }
        raster
    }

    /// Builder form of [`Raster::push_band`].
    pub fn with_band(mut self, name: &str, data: Array2<f32>) -> Result<Self> {
        self.push_band(name, data)?;
        Ok(self)
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Add a band, replacing any existing band of the same name.
    pub fn push_band(&mut self, name: &str, data: Array2<f32>) -> Result<()> {
        if data.dim() != self.valid.dim() {
            return Err(CanopyError::InvalidDimensions {
                expected: self.valid.dim(),
                actual: data.dim(),
            });
        }
        match self.bands.iter_mut().find(|b| b.name == name) {
            Some(band) => band.data = data,
            None => self.bands.push(Band {
                name: name.to_string(),
                data,
            }),
        }
        Ok(())
    }

    pub fn band(&self, name: &str) -> Result<&Array2<f32>> {
        self.bands
            .iter()
            .find(|b| b.name == name)
            .map(|b| &b.data)
            .ok_or_else(|| CanopyError::missing_band(name, "raster"))
    }

    pub fn has_band(&self, name: &str) -> bool {
        self.bands.iter().any(|b| b.name == name)
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    /// New raster holding only the named bands, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Raster> {
        let mut out = Raster {
            bands: Vec::with_capacity(names.len()),
            valid: self.valid.clone(),
            transform: self.transform,
            crs: self.crs.clone(),
        };
        for name in names {
            out.bands.push(Band {
                name: (*name).to_string(),
                data: self.band(name)?.clone(),
            });
        }
        Ok(out)
    }

    pub fn valid(&self) -> &Array2<bool> {
        &self.valid
    }

    /// AND the validity grid with `mask`.
    pub fn restrict(&mut self, mask: &Array2<bool>) -> Result<()> {
        if mask.dim() != self.valid.dim() {
            return Err(CanopyError::InvalidDimensions {
                expected: self.valid.dim(),
                actual: mask.dim(),
            });
        }
        Zip::from(&mut self.valid)
            .and(mask)
            .for_each(|v, &m| *v = *v && m);
        Ok(())
    }

    /// Value of `band` at (row, col), or `None` where the pixel is invalid.
    pub fn value(&self, band: &str, row: usize, col: usize) -> Result<Option<f32>> {
        let data = self.band(band)?;
        Ok(if self.valid[[row, col]] {
            Some(data[[row, col]])
        } else {
            None
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.valid.dim()
    }

    pub fn height(&self) -> usize {
        self.valid.nrows()
    }

    pub fn width(&self) -> usize {
        self.valid.ncols()
    }

    pub fn grid(&self) -> AnalysisGrid {
        AnalysisGrid::new(self.height(), self.width(), self.transform)
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// True when no pixel is valid.
    pub fn is_no_data(&self) -> bool {
        !self.valid.iter().any(|&v| v)
    }

    /// Nearest-neighbour resample onto `grid`, in the same coordinate reference.
    ///
    /// Target pixels whose centre falls outside this raster are invalid.
    /// Returns a clone when the grids already match.
    pub fn resample_to(&self, grid: &AnalysisGrid) -> Raster {
        if self.grid() == *grid {
            return self.clone();
        }

        let (h, w) = self.dim();
        let mut lookup = Array2::<Option<(usize, usize)>>::from_elem(grid.dim(), None);
        for ((row, col), slot) in lookup.indexed_iter_mut() {
            let (x, y) = grid.transform.pixel_center(row, col);
            *slot = self
                .transform
                .pixel_at(x, y)
                .filter(|&(r, c)| r < h && c < w);
        }

        let valid = lookup.mapv(|src| src.is_some_and(|(r, c)| self.valid[[r, c]]));
        let bands = self
            .bands
            .iter()
            .map(|band| Band {
                name: band.name.clone(),
                data: lookup.mapv(|src| src.map_or(0.0, |(r, c)| band.data[[r, c]])),
            })
            .collect();

        Raster {
            bands,
            valid,
            transform: grid.transform,
            crs: self.crs.clone(),
        }
    }
}
