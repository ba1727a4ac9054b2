use std::time::Duration;

/// Timing and presentation knobs of the playground.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundConfig {
    /// Quiet period after the last edit before a render fires.
    pub debounce: Duration,
    /// How long "done" stays in the status line.
    pub status_done_hide: Duration,
    /// How long an error title stays in the status line.
    pub status_error_hide: Duration,
    /// How long share feedback stays in the status line.
    pub status_share_hide: Duration,
    /// Device pixel ratio used when rasterizing PNG output.
    pub pixel_ratio: f32,
    /// File stem of downloadable artifacts (`<stem>.svg`, `<stem>.png`).
    pub download_stem: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
            status_done_hide: Duration::from_millis(500),
            status_error_hide: Duration::from_millis(500),
            status_share_hide: Duration::from_millis(2000),
            pixel_ratio: 1.0,
            download_stem: "graphviz".to_string(),
        }
    }
}

impl PlaygroundConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `DOTPAD_DEBOUNCE_MS` and `DOTPAD_PIXEL_RATIO`. Unparseable values
    /// are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(raw) = std::env::var("DOTPAD_DEBOUNCE_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => cfg.debounce = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid DOTPAD_DEBOUNCE_MS"),
            }
        }
        if let Ok(raw) = std::env::var("DOTPAD_PIXEL_RATIO") {
            match raw.trim().parse::<f32>() {
                Ok(r) if r.is_finite() && r > 0.0 => cfg.pixel_ratio = r,
                _ => tracing::warn!(value = %raw, "ignoring invalid DOTPAD_PIXEL_RATIO"),
            }
        }
        cfg
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            self.pixel_ratio = ratio;
        }
        self
    }

    pub fn with_download_stem(mut self, stem: impl Into<String>) -> Self {
        self.download_stem = stem.into();
        self
    }

    pub fn svg_file_name(&self) -> String {
        format!("{}.svg", self.download_stem)
    }

    pub fn png_file_name(&self) -> String {
        format!("{}.png", self.download_stem)
    }
}
