pub mod image_io;
pub mod manifest;

pub use image_io::{load_band, save_alerts, save_band, save_index, save_true_color_png};
pub use manifest::{SceneEntry, SceneManifest};
