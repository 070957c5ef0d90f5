pub mod median;
pub mod temporal;

pub use median::{compute_median, median_composite};
pub use temporal::{composite, CompositeConfig, CompositeImage, Provenance, Reducer};
