pub mod extract;
pub mod generator;
pub mod model;
pub mod prompt;

pub use extract::{extract_sql, format_sql, ExtractError};
pub use generator::{Engine, GenerationParams, SqlGenerator, TextModel};
pub use model::ModelSource;
pub use prompt::{build_prompt, CUE_MARKER};
