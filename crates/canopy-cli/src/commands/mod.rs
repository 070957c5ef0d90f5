pub mod args;
pub mod composite;
pub mod config;
pub mod pipeline;
pub mod regions;
pub mod scenes;
