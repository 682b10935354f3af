//! Shared input types

pub mod input;

pub use input::{ActionLog, AnalysisContext, AnalysisInput, CompositeInput};
