use ndarray::Array2;

use crate::geo::GeoTransform;

use super::config::Connectivity;

/// Statistics for a single connected component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentStats {
    /// Label in [`ComponentLabels::labels`], starting at 1.
    pub label: u32,
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
}

/// Dense labeling of a binary mask. Background is 0; components are
/// numbered 1..=n in raster scan order of their first pixel.
#[derive(Clone, Debug)]
pub struct ComponentLabels {
    pub labels: Array2<u32>,
    /// `components[i]` describes label `i + 1`.
    pub components: Vec<ComponentStats>,
}

impl ComponentLabels {
    pub fn area_of(&self, label: u32) -> Option<usize> {
        if label == 0 {
            return None;
        }
        self.components.get(label as usize - 1).map(|c| c.area)
    }
}

/// Alert raster: surviving pixels plus the size of the patch each belongs to.
///
/// Every true pixel of `alerts` belongs to a component whose exact size is at
/// least the minimum used to build it. `patch_size` is 0 off-alert.
#[derive(Clone, Debug)]
pub struct AlertMask {
    pub alerts: Array2<bool>,
    pub patch_size: Array2<u32>,
    pub transform: GeoTransform,
}

impl AlertMask {
    /// All-false mask of the given shape.
    pub fn empty(dim: (usize, usize), transform: GeoTransform) -> Self {
        Self {
            alerts: Array2::from_elem(dim, false),
            patch_size: Array2::zeros(dim),
            transform,
        }
    }

    pub fn with_transform(mut self, transform: GeoTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.alerts.iter().any(|&v| v)
    }
}

/// Connected component labeling using two-pass union-find.
///
/// Pass 1 assigns provisional labels from already-visited neighbours (left and
/// upper for 4-connectivity, plus both upper diagonals for 8-connectivity) and
/// records equivalences. Pass 2 resolves each pixel to its root and compacts
/// roots to consecutive labels. O(pixels) amortized.
pub fn label_components(mask: &Array2<bool>, connectivity: Connectivity) -> ComponentLabels {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return ComponentLabels {
            labels,
            components: Vec::new(),
        };
    }

    let mut next_label: u32 = 1;
    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0; 2];
    let mut neighbours = [0u32; 4];

    // Pass 1: assign provisional labels.
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            let mut count = 0;
            let mut push = |lbl: u32| {
                if lbl > 0 {
                    neighbours[count] = lbl;
                    count += 1;
                }
            };
            if col > 0 {
                push(labels[[row, col - 1]]);
            }
            if row > 0 {
                push(labels[[row - 1, col]]);
                if connectivity == Connectivity::Eight {
                    if col > 0 {
                        push(labels[[row - 1, col - 1]]);
                    }
                    if col + 1 < w {
                        push(labels[[row - 1, col + 1]]);
                    }
                }
            }

            if count == 0 {
                // New label.
                if next_label as usize >= parent.len() {
                    parent.resize(parent.len() * 2, 0);
                }
                parent[next_label as usize] = next_label;
                labels[[row, col]] = next_label;
                next_label += 1;
                continue;
            }

            let smallest = neighbours[..count].iter().copied().min().unwrap_or(0);
            labels[[row, col]] = smallest;
            for &other in &neighbours[..count] {
                if other != smallest {
                    union(&mut parent, smallest, other);
                }
            }
        }
    }

    // Map each root to a compact label.
    let mut compact = vec![0u32; next_label as usize];
    let mut components: Vec<ComponentStats> = Vec::new();

    // Pass 2: resolve labels and collect stats.
    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = find(&mut parent, lbl) as usize;
            if compact[root] == 0 {
                components.push(ComponentStats {
                    label: components.len() as u32 + 1,
                    area: 0,
                    bbox: (row, row, col, col),
                });
                compact[root] = components.len() as u32;
            }
            let id = compact[root];
            labels[[row, col]] = id;

            let entry = &mut components[id as usize - 1];
            entry.area += 1;
            entry.bbox.0 = entry.bbox.0.min(row);
            entry.bbox.1 = entry.bbox.1.max(row);
            entry.bbox.2 = entry.bbox.2.min(col);
            entry.bbox.3 = entry.bbox.3.max(col);
        }
    }

    ComponentLabels { labels, components }
}

/// Keep only pixels whose component has at least `min_size` pixels.
///
/// Sizes come from exact global labeling. `max_patch_count`, when set, only
/// saturates the reported `patch_size` values.
pub fn filter_by_size(
    mask: &Array2<bool>,
    connectivity: Connectivity,
    min_size: usize,
    max_patch_count: Option<usize>,
) -> AlertMask {
    let labeled = label_components(mask, connectivity);
    let cap = max_patch_count.unwrap_or(usize::MAX).max(1);

    let patch_size = labeled.labels.mapv(|lbl| match labeled.area_of(lbl) {
        Some(area) if area >= min_size => area.min(cap).min(u32::MAX as usize) as u32,
        _ => 0,
    });
    let alerts = patch_size.mapv(|size| size > 0);

    AlertMask {
        alerts,
        patch_size,
        transform: GeoTransform::default(),
    }
}

/// Root lookup with path halving.
fn find(parent: &mut [u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        let grand = parent[parent[x as usize] as usize];
        parent[x as usize] = grand;
        x = grand;
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
