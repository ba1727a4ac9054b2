#![forbid(unsafe_code)]

//! `dotpad` is a headless Graphviz playground.
//!
//! A [`Playground`] owns the editing session (controls, review panel, status line, share field)
//! and talks to the outside world only through the collaborators of a [`host::Host`]: the
//! editor buffer, a Graphviz compiler, the address bar and so on. Hosts drive it by forwarding
//! events (`on_text_changed`, control changes, history navigation) and by polling
//! [`Playground::tick`] at [`Playground::next_deadline`].
//!
//! # Features
//!
//! - `raster`: PNG output via pure-Rust SVG rasterization (`dotpad::raster`); also makes
//!   [`raster::ResvgRasterizer`] the default rasterizer of a [`host::Host`]

pub use dotpad_core::*;

pub mod host;
pub mod output;
pub mod pipeline;
pub mod playground;

#[cfg(feature = "raster")]
pub mod raster;

pub use dotpad_math as math;
pub use host::Host;
pub use output::{Artifact, DisplaySlot, Download, PanelState, ShareField};
pub use pipeline::{Failure, RenderOutcome, RenderPipeline, Ticket};
pub use playground::{Playground, RenderStatus, StartupLoad};

#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    #[error(transparent)]
    Core(#[from] dotpad_core::Error),
    #[error(transparent)]
    Math(#[from] dotpad_math::Error),
    #[error("{message}")]
    Conversion { message: String },
    #[error("PNG output needs a rasterizer")]
    NoRasterizer,
}

impl PlaygroundError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaygroundError::Core(err) => err.kind(),
            PlaygroundError::Math(_)
            | PlaygroundError::Conversion { .. }
            | PlaygroundError::NoRasterizer => ErrorKind::Conversion,
        }
    }
}

#[cfg(feature = "raster")]
impl From<raster::RasterError> for PlaygroundError {
    fn from(err: raster::RasterError) -> Self {
        PlaygroundError::Conversion {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaygroundError>;
