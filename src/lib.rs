pub mod build_tracker;
pub mod contexts;
pub mod data;
pub mod logging;
pub mod registries;
