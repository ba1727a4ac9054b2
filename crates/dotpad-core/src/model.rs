use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Graphviz layout engines offered by the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineId {
    Circo,
    #[default]
    Dot,
    Fdp,
    Sfdp,
    Neato,
    Osage,
    Patchwork,
    Twopi,
}

impl EngineId {
    pub const ALL: [EngineId; 8] = [
        EngineId::Circo,
        EngineId::Dot,
        EngineId::Fdp,
        EngineId::Sfdp,
        EngineId::Neato,
        EngineId::Osage,
        EngineId::Patchwork,
        EngineId::Twopi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EngineId::Circo => "circo",
            EngineId::Dot => "dot",
            EngineId::Fdp => "fdp",
            EngineId::Sfdp => "sfdp",
            EngineId::Neato => "neato",
            EngineId::Osage => "osage",
            EngineId::Patchwork => "patchwork",
            EngineId::Twopi => "twopi",
        }
    }

    /// Exact-match lookup among the option values (no trimming, no case folding).
    pub fn lookup(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == value)
    }
}

impl FromStr for EngineId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s).ok_or_else(|| Error::InvalidParameter {
            param: "engine",
            value: s.to_string(),
        })
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output formats offered by the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatId {
    #[default]
    Svg,
    Png,
    Json,
    Xdot,
    Plain,
    Ps,
}

impl FormatId {
    pub const ALL: [FormatId; 6] = [
        FormatId::Svg,
        FormatId::Png,
        FormatId::Json,
        FormatId::Xdot,
        FormatId::Plain,
        FormatId::Ps,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormatId::Svg => "svg",
            FormatId::Png => "png",
            FormatId::Json => "json",
            FormatId::Xdot => "xdot",
            FormatId::Plain => "plain",
            FormatId::Ps => "ps",
        }
    }

    pub fn lookup(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == value)
    }

    /// `svg` and `png` are both produced from SVG markup; everything else is a native text
    /// payload of the compiler.
    pub fn is_vector_source(self) -> bool {
        matches!(self, FormatId::Svg | FormatId::Png)
    }

    /// The format the compiler is asked for.
    pub fn compiler_format(self) -> FormatId {
        if self.is_vector_source() {
            FormatId::Svg
        } else {
            self
        }
    }
}

impl FromStr for FormatId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s).ok_or_else(|| Error::InvalidParameter {
            param: "format",
            value: s.to_string(),
        })
    }
}

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an outcome is presented in the display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Interactive vector image with pan/zoom and an `.svg` download.
    Vector,
    /// Rasterized image with a `.png` download.
    Raster,
    /// Verbatim text, no download.
    Text,
}

/// The control surface: engine and format selectors plus the raw-output toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub engine: EngineId,
    pub format: FormatId,
    pub raw: bool,
}

impl Controls {
    /// The raw toggle only means something for `svg`; other formats disable it.
    pub fn raw_available(&self) -> bool {
        self.format == FormatId::Svg
    }

    pub fn request(&self, source_text: impl Into<String>) -> RenderRequest {
        RenderRequest {
            source_text: source_text.into(),
            engine: self.engine,
            format: self.format,
            raw_mode: self.raw,
        }
    }
}

/// Immutable snapshot of everything a render needs, taken when the render is triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub source_text: String,
    pub engine: EngineId,
    pub format: FormatId,
    pub raw_mode: bool,
}

impl RenderRequest {
    pub fn presentation(&self) -> Presentation {
        match self.format {
            FormatId::Svg if !self.raw_mode => Presentation::Vector,
            FormatId::Png => Presentation::Raster,
            _ => Presentation::Text,
        }
    }
}

/// State attached to a pushed navigation step.
///
/// `content` is stored percent-encoded, exactly as it appears in the address fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub content: String,
    pub engine: EngineId,
}

impl HistoryEntry {
    pub fn new(source_text: &str, engine: EngineId) -> Self {
        Self {
            content: crate::url_state::encode_component(source_text),
            engine,
        }
    }

    /// Reads an entry back from a serialized history state object.
    ///
    /// Both `content` and `engine` must be present; anything else is not one of our entries.
    pub fn from_state(state: &serde_json::Value) -> Option<Self> {
        let obj = state.as_object()?;
        if !obj.contains_key("content") || !obj.contains_key("engine") {
            return None;
        }
        serde_json::from_value(state.clone()).ok()
    }

    pub fn to_state(&self) -> serde_json::Value {
        serde_json::json!({ "content": self.content, "engine": self.engine })
    }

    /// Decodes `content` once. The decoded text is never re-encoded into the entry.
    pub fn decoded_content(&self) -> Result<String> {
        crate::url_state::decode_component(&self.content)
    }
}

/// Everything needed to rebuild the editing session from a link. Raw mode is a local display
/// preference and is never shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareState {
    pub compressed_content: String,
    pub engine: EngineId,
    pub format: FormatId,
}
