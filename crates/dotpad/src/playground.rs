use crate::host::{Host, ViewerOptions};
use crate::output::{Artifact, DisplaySlot, Download, PanelState, RasterArtifact, ShareField};
use crate::pipeline::{Failure, RenderOutcome, RenderPipeline, Ticket};
use crate::PlaygroundError;
use dotpad_core::url_state::{decode_component, history_url};
use dotpad_core::{
    Controls, Debouncer, EngineId, ErrorKind, FormatId, HistoryEntry, PlaygroundConfig,
    Presentation, RenderRequest, ShareState, StartupPlan, StartupSource, StatusLine,
};
use dotpad_math::{DeterministicTextMeasurer, MathTypesetter};
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

const STATUS_RENDERING: &str = "rendering...";
const STATUS_DONE: &str = "done";
const STATUS_COPIED: &str = "Share URL copied to clipboard!";
const STATUS_GENERATED: &str = "Share URL generated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Channel {
    Edit,
}

/// What became of one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Presented(Presentation),
    Failed(ErrorKind),
    /// A newer request was submitted before this one finished; its outcome was dropped.
    Stale,
}

/// What [`Playground::load_startup`] did with the address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupLoad {
    /// The buffer now holds the address's source; `render` is set for sources that render on
    /// load (`raw` and `url`).
    Loaded { render: bool },
    /// The address names no source and the buffer was left alone.
    Existing,
    /// The source could not be loaded; the buffer was left alone.
    Failed(Failure),
}

/// One editing session.
///
/// All methods take `&self`: state lives in `Cell`/`RefCell` and no borrow is held across an
/// `.await`, so several renders (and a share) can be in flight on one executor.
pub struct Playground {
    host: Host,
    config: PlaygroundConfig,
    typesetter: MathTypesetter,
    pipeline: RenderPipeline,
    controls: Cell<Controls>,
    raw_available: Cell<bool>,
    presentation_mode: Cell<bool>,
    debouncer: RefCell<Debouncer<Channel, ()>>,
    status: RefCell<StatusLine>,
    panel: RefCell<PanelState>,
    slot: RefCell<DisplaySlot>,
    download: RefCell<Option<Download>>,
    share_field: RefCell<ShareField>,
    share_busy: Cell<bool>,
}

impl Playground {
    pub fn new(host: Host, config: PlaygroundConfig) -> Self {
        let controls = Controls::default();
        Self {
            typesetter: MathTypesetter::new(Arc::new(DeterministicTextMeasurer::default())),
            pipeline: RenderPipeline::new(),
            controls: Cell::new(controls),
            raw_available: Cell::new(controls.raw_available()),
            presentation_mode: Cell::new(false),
            debouncer: RefCell::new(Debouncer::new(config.debounce)),
            status: RefCell::new(StatusLine::new()),
            panel: RefCell::new(PanelState::default()),
            slot: RefCell::new(DisplaySlot::default()),
            download: RefCell::new(None),
            share_field: RefCell::new(ShareField::default()),
            share_busy: Cell::new(false),
            host,
            config,
        }
    }

    /// Replaces the measurer used to locate math labels.
    pub fn with_typesetter(mut self, typesetter: MathTypesetter) -> Self {
        self.typesetter = typesetter;
        self
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn controls(&self) -> Controls {
        self.controls.get()
    }

    /// Whether the raw-output toggle is enabled, as of the last presentation.
    pub fn raw_available(&self) -> bool {
        self.raw_available.get()
    }

    pub fn presentation_mode(&self) -> bool {
        self.presentation_mode.get()
    }

    pub fn status_text(&self) -> String {
        self.status.borrow().text().to_string()
    }

    pub fn panel(&self) -> PanelState {
        self.panel.borrow().clone()
    }

    pub fn artifact(&self) -> Option<Artifact> {
        self.slot.borrow().current().cloned()
    }

    pub fn download(&self) -> Option<Download> {
        self.download.borrow().clone()
    }

    pub fn share_field(&self) -> ShareField {
        self.share_field.borrow().clone()
    }

    pub fn share_busy(&self) -> bool {
        self.share_busy.get()
    }

    /// Editor change notification. Bursts collapse into one render, fired by [`Self::tick`]
    /// once the buffer has been quiet for the debounce period.
    pub fn on_text_changed(&self) {
        let now = self.host.clock.now();
        let armed = self.debouncer.borrow_mut().schedule(Channel::Edit, (), now);
        tracing::trace!(generation = armed.generation, "render debounce re-armed");
    }

    /// The next instant at which [`Self::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let debounce = self.debouncer.borrow().next_deadline();
        let status = self.status.borrow().next_deadline();
        match (debounce, status) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs due timers: the status auto-clear and the debounced render.
    pub async fn tick(&self) -> Option<RenderStatus> {
        let now = self.host.clock.now();
        let cleared = self.status.borrow_mut().tick(now);
        if cleared {
            self.host.status.show("");
        }
        let due = self.debouncer.borrow_mut().take_due(now);
        if due.is_empty() {
            return None;
        }
        Some(self.render_current().await)
    }

    /// Changes the selection without rendering.
    pub fn select_controls(&self, controls: Controls) {
        self.controls.set(controls);
        self.raw_available.set(controls.raw_available());
    }

    pub async fn set_controls(&self, controls: Controls) -> RenderStatus {
        self.controls.set(controls);
        self.render_current().await
    }

    pub async fn set_engine(&self, engine: EngineId) -> RenderStatus {
        self.set_controls(Controls {
            engine,
            ..self.controls()
        })
        .await
    }

    pub async fn set_format(&self, format: FormatId) -> RenderStatus {
        self.set_controls(Controls {
            format,
            ..self.controls()
        })
        .await
    }

    pub async fn set_raw(&self, raw: bool) -> RenderStatus {
        self.set_controls(Controls {
            raw,
            ..self.controls()
        })
        .await
    }

    /// Renders the editor buffer with the current controls.
    pub async fn render_current(&self) -> RenderStatus {
        let request = self.controls().request(self.host.text.text());
        self.render(request).await
    }

    pub async fn render(&self, request: RenderRequest) -> RenderStatus {
        let ticket = self.pipeline.submit();
        self.panel.borrow_mut().start();
        self.show_status(STATUS_RENDERING, None);
        tracing::debug!(
            seq = ticket.seq(),
            engine = %request.engine,
            format = %request.format,
            raw = request.raw_mode,
            "render submitted"
        );

        let outcome = RenderPipeline::compile(self.host.compiler.as_ref(), &request).await;
        if !self.pipeline.is_current(ticket) {
            tracing::debug!(seq = ticket.seq(), "discarding stale render outcome");
            return RenderStatus::Stale;
        }

        match self.present(ticket, &request, outcome).await {
            Ok(Some(presentation)) => {
                self.panel.borrow_mut().succeed();
                self.show_status(STATUS_DONE, Some(self.config.status_done_hide));
                self.push_history(&request);
                RenderStatus::Presented(presentation)
            }
            Ok(None) => {
                tracing::debug!(seq = ticket.seq(), "discarding stale presentation");
                RenderStatus::Stale
            }
            Err(failure) => {
                self.report(&failure);
                RenderStatus::Failed(failure.kind)
            }
        }
    }

    /// Build, then swap. Nothing visible changes until the new artifact is complete and still
    /// current. A compile failure leaves the slot alone; a failure while building leaves it empty.
    async fn present(
        &self,
        ticket: Ticket,
        request: &RenderRequest,
        outcome: RenderOutcome,
    ) -> Result<Option<Presentation>, Failure> {
        if let RenderOutcome::Failure(failure) = outcome {
            return Err(failure);
        }
        let presentation = request.presentation();
        let built = self.build(presentation, outcome).await;
        if !self.pipeline.is_current(ticket) {
            return Ok(None);
        }

        let (artifact, download) = match built {
            Ok(built) => built,
            Err(failure) => {
                self.slot.borrow_mut().detach();
                self.download.borrow_mut().take();
                return Err(failure);
            }
        };
        self.raw_available.set(request.format == FormatId::Svg);

        let shown = artifact.as_vector().cloned();
        {
            let mut slot = self.slot.borrow_mut();
            slot.detach();
            slot.attach(artifact);
        }
        *self.download.borrow_mut() = download;
        if let Some(doc) = shown {
            self.host.viewer.enable(&doc, ViewerOptions::default());
        }
        Ok(Some(presentation))
    }

    async fn build(
        &self,
        presentation: Presentation,
        outcome: RenderOutcome,
    ) -> Result<(Artifact, Option<Download>), Failure> {
        match (presentation, outcome) {
            (_, RenderOutcome::Failure(failure)) => Err(failure),
            (Presentation::Vector, RenderOutcome::VectorImage(mut doc)) => {
                if let Some(engine) = self.host.math.as_deref() {
                    match self.typesetter.typeset(engine, &mut doc).await {
                        Ok(report) => tracing::debug!(
                            typeset = report.typeset,
                            skipped = report.skipped,
                            "math labels typeset"
                        ),
                        Err(err) => tracing::warn!(error = %err, "math typesetting skipped"),
                    }
                }
                let download = Download::svg(self.config.svg_file_name(), &doc.to_markup());
                Ok((Artifact::Vector(doc), Some(download)))
            }
            (Presentation::Raster, RenderOutcome::VectorImage(doc)) => {
                let raster = self
                    .rasterize(&doc.to_markup())
                    .map_err(|err| Failure::new(err.kind(), err.to_string()))?;
                let download = Download::png(self.config.png_file_name(), &raster);
                Ok((Artifact::Raster(raster), Some(download)))
            }
            (_, RenderOutcome::VectorImage(doc)) => Ok((Artifact::Text(doc.to_markup()), None)),
            (_, RenderOutcome::TextPayload(text)) => Ok((Artifact::Text(text), None)),
        }
    }

    fn rasterize(&self, markup: &str) -> crate::Result<RasterArtifact> {
        let rasterizer = self
            .host
            .rasterizer
            .as_deref()
            .ok_or(PlaygroundError::NoRasterizer)?;
        let image = rasterizer.rasterize(markup, self.config.pixel_ratio)?;
        Ok(RasterArtifact::new(image, self.config.download_stem.clone()))
    }

    fn push_history(&self, request: &RenderRequest) {
        let entry = HistoryEntry::new(&request.source_text, request.engine);
        let url = history_url(&self.host.address.location(), &entry);
        self.host.address.push_state(&entry, &url);
    }

    /// History navigation. Restores the editor buffer from an entry we pushed; rendering is left
    /// to the buffer's own change notification.
    pub fn on_popstate(&self, state: &serde_json::Value) -> bool {
        let Some(entry) = HistoryEntry::from_state(state) else {
            return false;
        };
        match entry.decoded_content() {
            Ok(text) => {
                self.host.text.set_text(&text);
                true
            }
            Err(err) => {
                self.report(&Failure::from(&err));
                false
            }
        }
    }

    /// Builds a share link for the buffer and tries to copy it. Returns `None` when the link
    /// could not be built or a share is already in progress.
    pub async fn share(&self) -> Option<Url> {
        if self.share_busy.replace(true) {
            return None;
        }
        let url = self.share_inner().await;
        self.share_busy.set(false);
        url
    }

    async fn share_inner(&self) -> Option<Url> {
        let controls = self.controls();
        let compressed_content = match self.host.codec.compress(&self.host.text.text()) {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(error = ?err, "share link compression failed");
                self.report(&Failure::from(&err));
                self.share_field.borrow_mut().hide();
                return None;
            }
        };
        let state = ShareState {
            compressed_content,
            engine: controls.engine,
            format: controls.format,
        };
        let url = state.to_url(&self.host.address.location());
        self.share_field.borrow_mut().show(url.as_str());

        let copied = self.host.clipboard.write_text(url.as_str()).await;
        let message = if copied { STATUS_COPIED } else { STATUS_GENERATED };
        self.show_status(message, Some(self.config.status_share_hide));
        Some(url)
    }

    /// Applies the startup address: `engine` / `format` / `presentation` first, then the first
    /// source found among `raw`, `compressed`, `url` and the fragment. Returns the status of the
    /// render it triggered, if any.
    pub async fn startup(&self) -> Option<RenderStatus> {
        let render = match self.load_startup().await {
            StartupLoad::Loaded { render } => render,
            StartupLoad::Existing => !self.host.text.text().is_empty(),
            StartupLoad::Failed(_) => false,
        };
        if render {
            Some(self.render_current().await)
        } else {
            None
        }
    }

    /// The loading half of [`Self::startup`]: applies the address and fills the buffer, but
    /// never renders. Parameter problems and load failures are reported as usual.
    pub async fn load_startup(&self) -> StartupLoad {
        let location = self.host.address.location();
        let plan = StartupPlan::resolve(&location, self.controls());
        self.controls.set(plan.controls);
        self.raw_available.set(plan.controls.raw_available());
        self.presentation_mode.set(plan.presentation);
        for problem in &plan.problems {
            tracing::warn!(error = %problem, "ignoring address parameter");
            self.report(&Failure::from(problem));
        }

        let (text, render) = match plan.source {
            StartupSource::Raw(text) => (Ok(text), true),
            StartupSource::Compressed(compressed) => (
                self.host
                    .codec
                    .decompress(&compressed)
                    .map_err(|err| Failure::from(&err)),
                false,
            ),
            StartupSource::Remote(remote) => (self.fetch_source(&remote).await, true),
            StartupSource::Fragment(fragment) => (
                decode_component(&fragment).map_err(|err| Failure::from(&err)),
                false,
            ),
            StartupSource::Existing => return StartupLoad::Existing,
        };
        match text {
            Ok(text) => {
                self.host.text.set_text(&text);
                StartupLoad::Loaded { render }
            }
            Err(failure) => {
                self.report(&failure);
                StartupLoad::Failed(failure)
            }
        }
    }

    async fn fetch_source(&self, remote: &str) -> Result<String, Failure> {
        match self.host.fetcher.fetch(remote).await {
            Ok(response) if response.ok() => Ok(response.body),
            Ok(response) => {
                tracing::warn!(url = %remote, status = response.status, "remote source not loaded");
                let message = if response.body.trim().is_empty() {
                    format!("Failed to load {remote}: HTTP {}", response.status)
                } else {
                    response.body
                };
                Err(Failure::new(ErrorKind::Fetch, message))
            }
            Err(err) => {
                tracing::warn!(url = %remote, error = %err, "remote source not loaded");
                Err(Failure::new(ErrorKind::Fetch, err.message))
            }
        }
    }

    /// Window-resize hook: re-fits the attached vector image.
    pub fn resize_view(&self) {
        let has_vector = self
            .slot
            .borrow()
            .current()
            .is_some_and(|a| a.as_vector().is_some());
        if has_vector {
            self.host.viewer.resize();
            self.host.viewer.fit();
            self.host.viewer.center();
        }
    }

    fn report(&self, failure: &Failure) {
        self.panel
            .borrow_mut()
            .fail(failure.kind.title(), failure.message.clone());
        self.show_status(failure.kind.title(), Some(self.config.status_error_hide));
    }

    fn show_status(&self, text: &str, hide_after: Option<Duration>) {
        let now = self.host.clock.now();
        self.status.borrow_mut().show(text, hide_after, now);
        self.host.status.show(text);
    }
}
