//! Pipeline orchestration for the UPSC news curator.
//!
//! Ties the search source, the record parser and the LLM agents into one
//! sequential run (see [`Coordinator`]).

pub mod output;
pub mod pipeline;

pub use output::persist_artifact;
pub use pipeline::{
    Coordinator, CoordinatorOptions, PersistFailure, PipelineProgress, PipelineState, RunReport,
    SilentProgress,
};
