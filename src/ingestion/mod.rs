//! Data ingestion module - cleaning and import pipelines for dealer sales exports

pub mod clean;
pub mod error;
pub mod parse;
pub mod rules;
pub mod run;
pub mod save;
pub mod schema;
pub mod types;
pub mod utils;
pub mod write;

pub use error::{LoadError, TransformError};
pub use rules::CleanRules;
pub use run::{prepare_import, run_cleaner, run_importer};
pub use types::*;
