pub mod cloud;
pub mod index;

pub use cloud::{mask_clouds, CloudMaskConfig};
pub use index::{ndvi, normalized_difference, IndexBands};
