//! Collaborator seams of the playground.
//!
//! Each trait is what the browser page reaches through a global (editor, Graphviz worker,
//! pan/zoom widget, `history`, clipboard, `fetch`, canvas). A [`Host`] bundles one implementation
//! of each; everything except the text source, compiler and address bar has a no-op default.

use dotpad_core::{CompressionCodec, EngineId, FormatId, HistoryEntry, LzStringCodec, SvgDocument};
use dotpad_math::MathEngine;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use url::Url;

/// The editor buffer.
pub trait TextSource {
    fn text(&self) -> String;
    /// Replaces the buffer. Implementations relay their own change notification (if any) to
    /// [`crate::Playground::on_text_changed`]; the playground never renders as a side effect.
    fn set_text(&self, text: &str);
}

/// Compiler failure as reported by Graphviz. An empty message means none was available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Graphviz itself.
pub trait GraphCompiler {
    /// Lays out `source` with `engine` and emits `format` (`svg` markup or a native text payload).
    fn compile<'a>(
        &'a self,
        source: &'a str,
        engine: EngineId,
        format: FormatId,
    ) -> LocalBoxFuture<'a, Result<String, CompileError>>;
}

/// Options handed to the pan/zoom viewer when a vector image is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerOptions {
    pub zoom_enabled: bool,
    pub control_icons_enabled: bool,
    pub fit: bool,
    pub center: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            zoom_enabled: true,
            control_icons_enabled: true,
            fit: true,
            center: true,
        }
    }
}

/// Pan/zoom widget wrapped around the attached vector image.
pub trait ViewerControl {
    fn enable(&self, image: &SvgDocument, options: ViewerOptions);
    fn resize(&self);
    fn fit(&self);
    fn center(&self);
}

/// Where status text is shown. Called with an empty string when the text auto-clears.
pub trait StatusDisplay {
    fn show(&self, text: &str);
}

/// Location bar and session history.
pub trait AddressBar {
    fn location(&self) -> Url;
    fn push_state(&self, entry: &HistoryEntry, url: &Url);
}

pub trait Clipboard {
    /// Resolves to `true` when the text reached the clipboard.
    fn write_text<'a>(&'a self, text: &'a str) -> LocalBoxFuture<'a, bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

/// Loads remote source text for the `url` startup parameter.
pub trait ContentFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>>;
}

/// A rasterized rendering. `width`/`height` are the intrinsic display size; the PNG itself is
/// that size multiplied by the pixel ratio it was rendered at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub trait Rasterizer {
    fn rasterize(&self, svg: &str, pixel_ratio: f32) -> crate::Result<RasterImage>;
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

struct NoViewer;

impl ViewerControl for NoViewer {
    fn enable(&self, _image: &SvgDocument, _options: ViewerOptions) {}
    fn resize(&self) {}
    fn fit(&self) {}
    fn center(&self) {}
}

struct NoStatus;

impl StatusDisplay for NoStatus {
    fn show(&self, _text: &str) {}
}

struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write_text<'a>(&'a self, _text: &'a str) -> LocalBoxFuture<'a, bool> {
        futures::future::ready(false).boxed_local()
    }
}

struct NoFetcher;

impl ContentFetcher for NoFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>> {
        futures::future::ready(Err(FetchError {
            message: format!("remote loading is not available: {url}"),
        }))
        .boxed_local()
    }
}

/// Every collaborator the playground talks to.
#[derive(Clone)]
pub struct Host {
    pub text: Rc<dyn TextSource>,
    pub compiler: Rc<dyn GraphCompiler>,
    pub address: Rc<dyn AddressBar>,
    pub viewer: Rc<dyn ViewerControl>,
    pub status: Rc<dyn StatusDisplay>,
    pub clipboard: Rc<dyn Clipboard>,
    pub fetcher: Rc<dyn ContentFetcher>,
    pub rasterizer: Option<Rc<dyn Rasterizer>>,
    pub codec: Rc<dyn CompressionCodec>,
    pub math: Option<Rc<dyn MathEngine>>,
    pub clock: Rc<dyn Clock>,
}

impl Host {
    pub fn new(
        text: Rc<dyn TextSource>,
        compiler: Rc<dyn GraphCompiler>,
        address: Rc<dyn AddressBar>,
    ) -> Self {
        Self {
            text,
            compiler,
            address,
            viewer: Rc::new(NoViewer),
            status: Rc::new(NoStatus),
            clipboard: Rc::new(NoClipboard),
            fetcher: Rc::new(NoFetcher),
            rasterizer: default_rasterizer(),
            codec: Rc::new(LzStringCodec::new()),
            math: None,
            clock: Rc::new(SystemClock),
        }
    }

    pub fn with_viewer(mut self, viewer: Rc<dyn ViewerControl>) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn with_status(mut self, status: Rc<dyn StatusDisplay>) -> Self {
        self.status = status;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Rc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Rc<dyn ContentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Rc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn with_codec(mut self, codec: Rc<dyn CompressionCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_math(mut self, engine: Rc<dyn MathEngine>) -> Self {
        self.math = Some(engine);
        self
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[cfg(feature = "raster")]
fn default_rasterizer() -> Option<Rc<dyn Rasterizer>> {
    Some(Rc::new(crate::raster::ResvgRasterizer::default()))
}

#[cfg(not(feature = "raster"))]
fn default_rasterizer() -> Option<Rc<dyn Rasterizer>> {
    None
}
