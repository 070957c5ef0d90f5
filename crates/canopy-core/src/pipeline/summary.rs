use serde::{Deserialize, Serialize};

use crate::consts::SQUARE_METRES_PER_HECTARE;
use crate::detection::{label_components, AlertMask, Connectivity};
use crate::geo::AnalysisGrid;
use crate::region::Region;

/// Alert pixels falling inside one protected area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtectedOverlap {
    pub name: String,
    pub alert_pixels: usize,
    pub hectares: f64,
}

/// Aggregate figures for one run. Areas assume a metric CRS.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    /// Pixels flagged by the classifier before cleanup.
    pub candidate_pixels: usize,
    pub alert_pixels: usize,
    pub patch_count: usize,
    pub largest_patch_pixels: usize,
    pub alert_hectares: f64,
    /// Only protected areas with at least one alert pixel, largest first.
    pub protected: Vec<ProtectedOverlap>,
}

/// Summarize an alert mask; patches are counted with `connectivity`.
pub fn summarize(
    alerts: &AlertMask,
    connectivity: Connectivity,
    candidate_pixels: usize,
    protected_areas: &[Region],
) -> AlertSummary {
    let labeled = label_components(&alerts.alerts, connectivity);
    let alert_pixels = alerts.alert_count();
    let hectares_per_pixel = alerts.transform.pixel_area() / SQUARE_METRES_PER_HECTARE;

    let (h, w) = alerts.alerts.dim();
    let grid = AnalysisGrid::new(h, w, alerts.transform);
    let mut protected: Vec<ProtectedOverlap> = protected_areas
        .iter()
        .filter_map(|area| {
            let inside = area.mask_for(&grid);
            let count = alerts
                .alerts
                .iter()
                .zip(inside.iter())
                .filter(|(&a, &i)| a && i)
                .count();
            (count > 0).then(|| ProtectedOverlap {
                name: area.name.clone(),
                alert_pixels: count,
                hectares: count as f64 * hectares_per_pixel,
            })
        })
        .collect();
    protected.sort_by(|a, b| b.alert_pixels.cmp(&a.alert_pixels));

    AlertSummary {
        candidate_pixels,
        alert_pixels,
        patch_count: labeled.components.len(),
        largest_patch_pixels: labeled.components.iter().map(|c| c.area).max().unwrap_or(0),
        alert_hectares: alert_pixels as f64 * hectares_per_pixel,
        protected,
    }
}
