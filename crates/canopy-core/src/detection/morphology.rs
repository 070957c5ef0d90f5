use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Binary erosion with a (2r+1)x(2r+1) square kernel.
///
/// A pixel stays true only if every in-bounds pixel of its window is true.
/// Window positions outside the raster are ignored, so foreground touching
/// the image edge is not eroded by the edge itself. `radius == 0` is the
/// identity. Runs separably (rows, then columns) in O(pixels) per pass.
pub fn erode(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    if radius == 0 || mask.is_empty() {
        return mask.clone();
    }
    let rows = erode_lines(mask, radius, Axis(1));
    erode_lines(&rows, radius, Axis(0))
}

/// 1-D erosion of every lane along `axis`.
fn erode_lines(mask: &Array2<bool>, radius: usize, axis: Axis) -> Array2<bool> {
    let mut out = Array2::from_elem(mask.dim(), false);
    let erode_lane = |src: ArrayView1<bool>, mut dst: ArrayViewMut1<bool>| {
        let n = src.len();
        // Prefix count of background pixels.
        let mut background = vec![0usize; n + 1];
        for (i, &v) in src.iter().enumerate() {
            background[i + 1] = background[i] + usize::from(!v);
        }
        for (i, d) in dst.iter_mut().enumerate() {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(n);
            *d = background[hi] == background[lo];
        }
    };

    if mask.len() >= PARALLEL_PIXEL_THRESHOLD {
        Zip::from(mask.lanes(axis))
            .and(out.lanes_mut(axis))
            .par_for_each(erode_lane);
    } else {
        Zip::from(mask.lanes(axis))
            .and(out.lanes_mut(axis))
            .for_each(erode_lane);
    }
    out
}
