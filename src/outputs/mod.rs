//! Writers for everything the pipeline puts on disk besides the TypeScript file.
//!
//! - [`snapshot`]: timestamped collector CSVs and in-place rewrites
//! - [`json`]: `scores.json` and `official_scores.json`

pub mod json;
pub mod snapshot;
