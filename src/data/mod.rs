//! Data loading and aggregation
//!
//! Everything between the incident file on disk and the chart-ready view
//! results lives here.
//!
//! ## Pipeline
//!
//! - `frame_reader` / `csv_parser` turn a file or text into an untyped table
//! - `loader` checks the schema and types every row into an `IncidentTable`
//! - `views` computes the ten summary views over that table
//! - `generator` produces a synthetic dataset for the demo
//!
//! ## Error Handling
//!
//! All data operations return `DataResult<T>` which uses the `DataError` type.
//! Common errors include:
//! - `Schema`: required columns missing from the header
//! - `Parse`: a cell could not be coerced to its type
//! - `TooLarge` / `TooManyRows`: dataset exceeds limits
//! - `Io`: File system errors

mod csv_parser;
mod error;
mod frame_reader;
pub mod generator;
mod loader;
pub mod views;

pub use csv_parser::*;
pub use error::*;
pub use frame_reader::*;
pub use loader::*;
pub use views::{
    compute, compute_all, EmptyGroupWarning, ViewReport, ViewResult, ViewSet,
};
