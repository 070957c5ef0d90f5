pub mod composite;
pub mod consts;
pub mod detection;
pub mod display;
pub mod error;
pub mod geo;
pub mod imagery;
pub mod io;
pub mod pipeline;
pub mod raster;
pub mod region;
pub mod scene;
pub mod source;
