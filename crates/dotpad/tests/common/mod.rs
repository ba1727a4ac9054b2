#![allow(dead_code)]

use dotpad::host::{
    AddressBar, Clipboard, CompileError, ContentFetcher, FetchError, FetchResponse, GraphCompiler,
    ManualClock, RasterImage, Rasterizer, StatusDisplay, TextSource, ViewerControl, ViewerOptions,
};
use dotpad::math::MathEngine;
use dotpad::{EngineId, FormatId, HistoryEntry, Host, Playground, PlaygroundConfig, SvgDocument};
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use url::Url;

pub fn graph_svg(title: &str, label: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN"
 "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<!-- Generated by graphviz -->
<svg width="62pt" height="44pt"
 viewBox="0.00 0.00 62.00 44.00" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<g id="graph0" class="graph" transform="scale(1 1) rotate(0) translate(4 40)">
<title>{title}</title>
<g id="node1" class="node">
<title>a</title>
<ellipse fill="none" stroke="black" cx="27" cy="-18" rx="27" ry="18"/>
<text text-anchor="middle" x="27" y="-14.3" font-family="Times,serif" font-size="14.00">{label}</text>
</g>
</g>
</svg>
"#
    )
}

#[derive(Default)]
pub struct Editor {
    pub text: RefCell<String>,
    pub sets: Cell<usize>,
}

impl Editor {
    pub fn with_text(text: &str) -> Rc<Self> {
        Rc::new(Self {
            text: RefCell::new(text.to_string()),
            sets: Cell::new(0),
        })
    }
}

impl TextSource for Editor {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
        self.sets.set(self.sets.get() + 1);
    }
}

pub type Reply = Result<String, CompileError>;

/// Answers `svg` with [`graph_svg`] (titled with the source) and other formats with a
/// `<format>:<source>` payload. Sources containing `syntax error` fail. Queued gates take
/// precedence, one per call.
#[derive(Default)]
pub struct Compiler {
    pub calls: RefCell<Vec<(String, EngineId, FormatId)>>,
    pub gates: RefCell<VecDeque<oneshot::Receiver<Reply>>>,
    pub label: RefCell<String>,
}

impl Compiler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            label: RefCell::new("a".to_string()),
            ..Self::default()
        })
    }

    pub fn gate(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn reply(&self, source: &str, format: FormatId) -> Reply {
        if source.contains("syntax error") {
            return Err(CompileError::new("syntax error in line 1 near '}'"));
        }
        match format {
            FormatId::Svg => Ok(graph_svg(source, &self.label.borrow())),
            other => Ok(format!("{other}:{source}")),
        }
    }
}

impl GraphCompiler for Compiler {
    fn compile<'a>(
        &'a self,
        source: &'a str,
        engine: EngineId,
        format: FormatId,
    ) -> LocalBoxFuture<'a, Result<String, CompileError>> {
        self.calls
            .borrow_mut()
            .push((source.to_string(), engine, format));
        let gate = self.gates.borrow_mut().pop_front();
        async move {
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(CompileError::new("compiler went away"))),
                None => self.reply(source, format),
            }
        }
        .boxed_local()
    }
}

pub struct Address {
    pub location: RefCell<Url>,
    pub pushed: RefCell<Vec<(HistoryEntry, Url)>>,
}

impl Address {
    pub fn at(url: &str) -> Rc<Self> {
        Rc::new(Self {
            location: RefCell::new(Url::parse(url).unwrap()),
            pushed: RefCell::new(Vec::new()),
        })
    }
}

impl AddressBar for Address {
    fn location(&self) -> Url {
        self.location.borrow().clone()
    }

    fn push_state(&self, entry: &HistoryEntry, url: &Url) {
        self.pushed.borrow_mut().push((entry.clone(), url.clone()));
        *self.location.borrow_mut() = url.clone();
    }
}

#[derive(Default)]
pub struct Viewer {
    pub calls: RefCell<Vec<&'static str>>,
    pub options: RefCell<Vec<ViewerOptions>>,
}

impl ViewerControl for Viewer {
    fn enable(&self, _image: &SvgDocument, options: ViewerOptions) {
        self.calls.borrow_mut().push("enable");
        self.options.borrow_mut().push(options);
    }

    fn resize(&self) {
        self.calls.borrow_mut().push("resize");
    }

    fn fit(&self) {
        self.calls.borrow_mut().push("fit");
    }

    fn center(&self) {
        self.calls.borrow_mut().push("center");
    }
}

#[derive(Default)]
pub struct Status {
    pub shown: RefCell<Vec<String>>,
}

impl StatusDisplay for Status {
    fn show(&self, text: &str) {
        self.shown.borrow_mut().push(text.to_string());
    }
}

#[derive(Default)]
pub struct Board {
    pub accept: Cell<bool>,
    pub gate: RefCell<Option<oneshot::Receiver<bool>>>,
    pub copied: RefCell<Vec<String>>,
}

impl Clipboard for Board {
    fn write_text<'a>(&'a self, text: &'a str) -> LocalBoxFuture<'a, bool> {
        self.copied.borrow_mut().push(text.to_string());
        let gate = self.gate.borrow_mut().take();
        let accept = self.accept.get();
        async move {
            match gate {
                Some(rx) => rx.await.unwrap_or(false),
                None => accept,
            }
        }
        .boxed_local()
    }
}

pub struct Fetcher {
    pub reply: Result<FetchResponse, FetchError>,
    pub asked: RefCell<Vec<String>>,
}

impl Fetcher {
    pub fn status(status: u16, body: &str) -> Rc<Self> {
        Rc::new(Self {
            reply: Ok(FetchResponse {
                status,
                body: body.to_string(),
            }),
            asked: RefCell::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Rc<Self> {
        Rc::new(Self {
            reply: Err(FetchError {
                message: message.to_string(),
            }),
            asked: RefCell::new(Vec::new()),
        })
    }
}

impl ContentFetcher for Fetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>> {
        self.asked.borrow_mut().push(url.to_string());
        futures::future::ready(self.reply.clone()).boxed_local()
    }
}

/// Pretends every SVG is 62×44 CSS px.
#[derive(Default)]
pub struct Raster {
    pub ratios: RefCell<Vec<f32>>,
    pub inputs: RefCell<Vec<String>>,
}

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

impl Rasterizer for Raster {
    fn rasterize(&self, svg: &str, pixel_ratio: f32) -> dotpad::Result<RasterImage> {
        self.ratios.borrow_mut().push(pixel_ratio);
        self.inputs.borrow_mut().push(svg.to_string());
        Ok(RasterImage {
            png: FAKE_PNG.to_vec(),
            width: 62,
            height: 44,
        })
    }
}

/// Renders every expression as a 2em-tall box.
/// Math engine whose readiness can be held back with a gate.
pub struct Math {
    pub ready: bool,
    pub gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl Math {
    pub fn new(ready: bool) -> Rc<Self> {
        Rc::new(Self {
            ready,
            gate: RefCell::new(None),
        })
    }

    /// Holds the next readiness wait until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }
}

impl MathEngine for Math {
    fn ready(&self) -> LocalBoxFuture<'_, bool> {
        let gate = self.gate.borrow_mut().take();
        let ready = self.ready;
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            ready
        }
        .boxed_local()
    }

    fn tex_to_svg<'a>(&'a self, tex: &'a str) -> LocalBoxFuture<'a, dotpad::math::Result<String>> {
        futures::future::ready(Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="3ex" height="2em" viewBox="0 -800 1200 1000"><g data-tex="{}"><path d="M0 0h100"/></g></svg>"#,
            tex.replace('"', "&quot;")
        )))
        .boxed_local()
    }
}

/// A playground wired to recording fakes.
pub struct Rig {
    pub editor: Rc<Editor>,
    pub compiler: Rc<Compiler>,
    pub address: Rc<Address>,
    pub viewer: Rc<Viewer>,
    pub status: Rc<Status>,
    pub board: Rc<Board>,
    pub raster: Rc<Raster>,
    pub clock: Rc<ManualClock>,
}

impl Rig {
    pub fn new(text: &str, location: &str) -> Self {
        Self {
            editor: Editor::with_text(text),
            compiler: Compiler::new(),
            address: Address::at(location),
            viewer: Rc::new(Viewer::default()),
            status: Rc::new(Status::default()),
            board: Rc::new(Board::default()),
            raster: Rc::new(Raster::default()),
            clock: Rc::new(ManualClock::new()),
        }
    }

    pub fn host(&self) -> Host {
        Host::new(
            self.editor.clone(),
            self.compiler.clone(),
            self.address.clone(),
        )
        .with_viewer(self.viewer.clone())
        .with_status(self.status.clone())
        .with_clipboard(self.board.clone())
        .with_rasterizer(self.raster.clone())
        .with_clock(self.clock.clone())
    }

    pub fn playground(&self) -> Playground {
        self.playground_with(self.host(), PlaygroundConfig::default())
    }

    pub fn playground_with(&self, host: Host, config: PlaygroundConfig) -> Playground {
        Playground::new(host, config)
    }

    pub fn statuses(&self) -> Vec<String> {
        self.status.shown.borrow().clone()
    }
}
