//! Business logic services.

mod analysis;
pub mod normalize;

pub use analysis::AnalysisService;
pub use normalize::normalize;
