//! Data models for threadkb.
//!
//! Everything here lives for a single request/response cycle.

mod analysis;
mod model_config;

pub use analysis::{AnalysisResult, AnalyzeRequest, ProblemSolution};
pub use model_config::{
    DEFAULT_HOSTED_MODEL, DEFAULT_LOCAL_ENDPOINT, DEFAULT_LOCAL_MODEL, ModelConfig,
    ModelConfigInput, Provider,
};
