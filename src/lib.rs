//! Incident operations dashboard.
//!
//! Loads a synthetic incident dataset, computes ten summary views over it and
//! renders each as a chart, either served as a tabbed web page or written out
//! as static SVG figures.

pub mod constants;
pub mod data;
pub mod perf;
pub mod render;
pub mod server;
pub mod settings;
pub mod types;
