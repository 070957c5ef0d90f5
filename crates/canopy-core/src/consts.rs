/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Divisor mapping Sentinel-2 L2A digital numbers to surface reflectance.
pub const REFLECTANCE_SCALE: f32 = 10_000.0;

/// QA60 bit flagging opaque clouds.
pub const QA_CLOUD_BIT: u8 = 10;

/// QA60 bit flagging cirrus.
pub const QA_CIRRUS_BIT: u8 = 11;

pub const QA_BAND: &str = "QA60";
pub const BLUE_BAND: &str = "B2";
pub const GREEN_BAND: &str = "B3";
pub const RED_BAND: &str = "B4";
pub const NIR_BAND: &str = "B8";

/// Name of the normalized difference vegetation index band.
pub const NDVI_BAND: &str = "NDVI";

/// Baseline NDVI must exceed this to count as forest.
pub const DEFAULT_FOREST_THRESHOLD: f32 = 0.75;

/// Current NDVI must be below this to count as bare ground.
pub const DEFAULT_BARE_THRESHOLD: f32 = 0.40;

/// Smallest patch kept by default. Sizes are compared with `>=`, so 21 matches
/// a strict "more than 20 pixels" rule.
pub const DEFAULT_MIN_PATCH_SIZE: usize = 21;

/// Reported patch sizes saturate at this count by default.
pub const DEFAULT_MAX_PATCH_COUNT: usize = 100;

/// Scenes with a larger tile-level cloud percentage are rejected by default.
pub const DEFAULT_MAX_CLOUD_COVER_PCT: f32 = 30.0;

/// Default worker count for concurrent scene fetching.
pub const DEFAULT_FETCH_WORKERS: usize = 2;

/// Square metres per hectare.
pub const SQUARE_METRES_PER_HECTARE: f64 = 10_000.0;

/// Initial delay before the first retry of an unavailable scene source.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 250;

/// Retry attempts against an unavailable scene source.
pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;

/// File name of the scene manifest inside a scene directory.
pub const SCENE_MANIFEST_FILE: &str = "scenes.toml";
