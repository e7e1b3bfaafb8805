//! aimark-core — Sheet model, rubric scoring, and the grading engine.
//!
//! This crate defines the fundamental data model and the grading pass
//! that the entire aimark system builds on.

pub mod engine;
pub mod error;
pub mod prompt;
pub mod report;
pub mod rubric;
pub mod table;
pub mod traits;
pub mod validate;
