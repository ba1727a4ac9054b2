#![forbid(unsafe_code)]

//! Inline TeX typesetting for Graphviz SVG output.
//!
//! Labels such as `"$x^2$"` are rendered by a [`MathEngine`] and swapped in as `<g>` groups
//! whose transform scales the math to the label's height and centers it on the label.

pub mod delimiters;
pub mod engine;
pub mod geometry;
pub mod text;
pub mod typeset;

pub use engine::MathEngine;
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};
pub use typeset::{MathSpan, MathTypesetter, TypesetReport};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("math engine is not available")]
    EngineUnavailable,
    #[error("math engine failed to convert `{tex}`: {message}")]
    Conversion { tex: String, message: String },
    #[error(transparent)]
    Svg(#[from] dotpad_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
