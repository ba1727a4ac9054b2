#![forbid(unsafe_code)]

//! Headless building blocks of the dotpad Graphviz playground.
//!
//! Design goals:
//! - every piece of editor state that leaves the process (address fragment, history entries,
//!   share links) round-trips through a typed codec
//! - engine and format selections are closed enumerations, validated before use
//! - clock-driven state machines (debounce, status auto-clear) instead of ambient timers

pub mod codec;
pub mod config;
pub mod debounce;
pub mod error;
pub mod model;
pub mod status;
pub mod svg;
pub mod url_state;

pub use codec::{CompressionCodec, LzStringCodec};
pub use config::PlaygroundConfig;
pub use debounce::Debouncer;
pub use error::{Error, ErrorKind, Result};
pub use model::{
    Controls, EngineId, FormatId, HistoryEntry, Presentation, RenderRequest, ShareState,
};
pub use status::StatusLine;
pub use svg::{SvgDocument, SvgElement, SvgNode};
pub use url_state::{StartupPlan, StartupSource, UrlParams};

#[cfg(test)]
mod tests;
