//! Portable Quill semantic-analysis driver.
//!
//! Runs the full pipeline over one compilation unit: bind -> lower ->
//! control-flow analyses -> entry-point validation, accumulating every
//! diagnostic into one ordered list. No filesystem IO and no CLI surface;
//! source trees come from the external parser, results go out as a
//! [`BoundProgram`] for the evaluator and emitter.

mod output;
mod pipeline;

pub use output::BoundProgram;
pub use pipeline::{compile, compile_with_config, CompileConfig};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
