use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{CanopyError, Result};
use crate::raster::Raster;

/// Per-pixel median over the valid observations of each band.
///
/// All rasters must share one grid. A pixel with no valid observation is
/// invalid in the output. Uses `select_nth_unstable` for O(n) median without
/// full sort and parallelizes at the row level for images >= 256x256.
pub fn median_composite(rasters: &[Raster], bands: &[&str]) -> Result<Raster> {
    let Some(first) = rasters.first() else {
        return Err(CanopyError::InvalidConfig(
            "median composite needs at least one raster".into(),
        ));
    };
    let (h, w) = first.dim();
    for r in rasters {
        if r.dim() != (h, w) {
            return Err(CanopyError::InvalidDimensions {
                expected: (h, w),
                actual: r.dim(),
            });
        }
    }

    let valid = Array2::from_shape_fn((h, w), |(row, col)| {
        rasters.iter().any(|r| r.valid()[[row, col]])
    });
    let mut out = Raster::new(valid, first.transform);
    out.crs = first.crs.clone();

    for &name in bands {
        let stack: Vec<(&Array2<f32>, &Array2<bool>)> = rasters
            .iter()
            .map(|r| Ok((r.band(name)?, r.valid())))
            .collect::<Result<_>>()?;
        out.push_band(name, median_band(&stack, h, w))?;
    }
    Ok(out)
}

fn median_band(stack: &[(&Array2<f32>, &Array2<bool>)], h: usize, w: usize) -> Array2<f32> {
    let n = stack.len();

    if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
        // Row-parallel: each row allocates its own pixel_values
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| {
                let mut pixel_values = Vec::with_capacity(n);
                (0..w)
                    .map(|col| median_at(stack, row, col, &mut pixel_values))
                    .collect()
            })
            .collect();

        let mut result = Array2::<f32>::zeros((h, w));
        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
        result
    } else {
        let mut pixel_values = Vec::with_capacity(n);
        Array2::from_shape_fn((h, w), |(row, col)| {
            median_at(stack, row, col, &mut pixel_values)
        })
    }
}

/// Median of the valid values at one pixel, 0.0 where there are none
/// (the caller marks such pixels invalid).
fn median_at(
    stack: &[(&Array2<f32>, &Array2<bool>)],
    row: usize,
    col: usize,
    pixel_values: &mut Vec<f32>,
) -> f32 {
    pixel_values.clear();
    for (data, valid) in stack {
        if valid[[row, col]] {
            pixel_values.push(data[[row, col]]);
        }
    }
    compute_median(pixel_values).unwrap_or(0.0)
}

/// Middle value for odd counts, mean of the two middle values for even counts.
/// Reorders `pixel_values` in place.
pub fn compute_median(pixel_values: &mut [f32]) -> Option<f32> {
    let n = pixel_values.len();
    match n {
        0 => None,
        1 => Some(pixel_values[0]),
        _ if n % 2 == 1 => {
            let mid = n / 2;
            Some(
                *pixel_values
                    .select_nth_unstable_by(mid, |a, b| a.total_cmp(b))
                    .1,
            )
        }
        _ => {
            let mid = n / 2;
            pixel_values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            pixel_values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
            Some((pixel_values[mid - 1] + pixel_values[mid]) / 2.0)
        }
    }
}
