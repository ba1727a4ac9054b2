//! The review panel: display slot, download link, error panel and share field.

use crate::host::RasterImage;
use base64::Engine as _;
use dotpad_core::SvgDocument;
use dotpad_core::url_state::encode_component;

#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// Interactive image, possibly with typeset math.
    Vector(SvgDocument),
    Raster(RasterArtifact),
    /// Raw SVG markup or a text-format payload, shown verbatim.
    Text(String),
}

impl Artifact {
    pub fn as_vector(&self) -> Option<&SvgDocument> {
        match self {
            Artifact::Vector(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Artifact::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_raster(&self) -> Option<&RasterArtifact> {
        match self {
            Artifact::Raster(raster) => Some(raster),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterArtifact {
    pub image: RasterImage,
    /// `data:image/png;base64,…`, also used as the download href.
    pub data_uri: String,
    pub title: String,
}

impl RasterArtifact {
    pub fn new(image: RasterImage, title: impl Into<String>) -> Self {
        let data_uri = png_data_uri(&image.png);
        Self {
            image,
            data_uri,
            title: title.into(),
        }
    }
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

pub fn svg_data_uri(markup: &str) -> String {
    format!(
        "data:image/svg+xml;charset=utf-8,{}",
        encode_component(markup)
    )
}

/// Holds at most one artifact. Replacing one is always detach, then attach.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySlot {
    artifact: Option<Artifact>,
}

impl DisplaySlot {
    pub fn detach(&mut self) -> Option<Artifact> {
        self.artifact.take()
    }

    /// Attaches into an empty slot. Whatever was still attached is returned.
    pub fn attach(&mut self, artifact: Artifact) -> Option<Artifact> {
        self.artifact.replace(artifact)
    }

    pub fn current(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.artifact.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub href: String,
}

impl Download {
    pub fn svg(file_name: impl Into<String>, markup: &str) -> Self {
        Self {
            file_name: file_name.into(),
            href: svg_data_uri(markup),
        }
    }

    pub fn png(file_name: impl Into<String>, raster: &RasterArtifact) -> Self {
        Self {
            file_name: file_name.into(),
            href: raster.data_uri.clone(),
        }
    }

    /// Payload of the href, decoded.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        if let Some(b64) = self.href.strip_prefix("data:image/png;base64,") {
            return base64::engine::general_purpose::STANDARD.decode(b64).ok();
        }
        let encoded = self.href.strip_prefix("data:image/svg+xml;charset=utf-8,")?;
        dotpad_core::url_state::decode_component(encoded)
            .ok()
            .map(String::into_bytes)
    }
}

/// `working` / `error` markers of the review panel. `title` and `error` are set together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelState {
    pub working: bool,
    pub title: Option<&'static str>,
    pub error: Option<String>,
}

impl PanelState {
    pub fn start(&mut self) {
        self.working = true;
        self.title = None;
        self.error = None;
    }

    pub fn succeed(&mut self) {
        self.working = false;
        self.title = None;
        self.error = None;
    }

    pub fn fail(&mut self, title: &'static str, message: impl Into<String>) {
        self.working = false;
        self.title = Some(title);
        self.error = Some(message.into());
    }

    /// The panel text, `<title>: <message>`.
    pub fn text(&self) -> Option<String> {
        let message = self.error.as_deref()?;
        Some(match self.title {
            Some(title) => format!("{title}: {message}"),
            None => message.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareField {
    pub visible: bool,
    pub value: String,
}

impl ShareField {
    pub fn show(&mut self, value: impl Into<String>) {
        self.visible = true;
        self.value = value.into();
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.value.clear();
    }
}
