// core/src/workflow/mod.rs

//! A small sequential workflow engine.
//!
//! A pipeline is an ordered list of named steps. Each step carries one or more
//! async handlers operating on a shared [`ContextData`]; a handler either lets
//! the run continue or stops it early. The lifecycle flows in [`crate::flows`]
//! are built on top of it.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline, SkipCondition, StepDef};
