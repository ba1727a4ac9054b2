//! Address-bar state: the history channel (fragment + pushed entries), the share channel
//! (`compressed` / `engine` / `format` query parameters) and startup resolution.

use crate::{Controls, EngineId, Error, FormatId, HistoryEntry, Result, ShareState};
use url::Url;

/// Percent-encodes like `encodeURIComponent`.
pub fn encode_component(text: &str) -> String {
    let encoded = urlencoding::encode(text);
    // `encodeURIComponent` leaves `!'()*` alone; `urlencoding` escapes them.
    if !text.contains(['!', '\'', '(', ')', '*']) {
        return encoded.into_owned();
    }
    encoded
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

pub fn decode_component(encoded: &str) -> Result<String> {
    urlencoding::decode(encoded)
        .map(|s| s.into_owned())
        .map_err(|e| Error::InvalidFragment {
            message: e.to_string(),
        })
}

/// Sets `key` like `URLSearchParams.set`: the first occurrence is replaced, later ones are
/// dropped, and the pair is appended when absent.
pub fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut seen = false;
    pairs.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        *v = value.to_string();
        true
    });
    if !seen {
        pairs.push((key.to_string(), value.to_string()));
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

/// Address for a pushed history entry: fragment carries the encoded source, `engine` is kept in
/// the query.
pub fn history_url(current: &Url, entry: &HistoryEntry) -> Url {
    let mut url = current.clone();
    url.set_fragment(Some(&entry.content));
    set_query_param(&mut url, "engine", entry.engine.as_str());
    url
}

impl ShareState {
    /// Builds the share link from the current location: existing query and fragment are dropped.
    pub fn to_url(&self, current: &Url) -> Url {
        let mut url = current.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut()
            .append_pair("compressed", &self.compressed_content)
            .append_pair("engine", self.engine.as_str())
            .append_pair("format", self.format.as_str());
        url
    }

    /// Reads a share link back. Missing or invalid `engine` / `format` make it not a share link.
    pub fn from_url(url: &Url) -> Option<Self> {
        let params = UrlParams::from_url(url);
        Some(Self {
            compressed_content: params.compressed?,
            engine: EngineId::lookup(params.engine.as_deref()?)?,
            format: FormatId::lookup(params.format.as_deref()?)?,
        })
    }
}

/// The query parameters the playground understands. Each holds its first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    pub raw: Option<String>,
    pub compressed: Option<String>,
    pub url: Option<String>,
    pub engine: Option<String>,
    pub format: Option<String>,
    pub presentation: bool,
    pub fragment: Option<String>,
}

impl UrlParams {
    pub fn from_url(url: &Url) -> Self {
        let mut out = Self::default();
        for (k, v) in url.query_pairs() {
            let slot = match k.as_ref() {
                "raw" => &mut out.raw,
                "compressed" => &mut out.compressed,
                "url" => &mut out.url,
                "engine" => &mut out.engine,
                "format" => &mut out.format,
                "presentation" => {
                    out.presentation = true;
                    continue;
                }
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(v.into_owned());
            }
        }
        out.fragment = url
            .fragment()
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        out
    }
}

/// Where the initial document comes from. Variants are in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupSource {
    /// Literal source text; rendered immediately.
    Raw(String),
    /// Codec-encoded source text; loaded without rendering.
    Compressed(String),
    /// Remote location of the source text; fetched, then rendered.
    Remote(String),
    /// Percent-encoded source text from the fragment; loaded without rendering.
    Fragment(String),
    /// Nothing in the address: render whatever the editor already holds.
    Existing,
}

/// Result of reading the startup address.
#[derive(Debug)]
pub struct StartupPlan {
    /// Controls after applying valid `engine` / `format` parameters.
    pub controls: Controls,
    /// Parameter problems to report. None of them blocks startup.
    pub problems: Vec<Error>,
    pub presentation: bool,
    pub source: StartupSource,
}

impl StartupPlan {
    pub fn resolve(url: &Url, current: Controls) -> Self {
        let params = UrlParams::from_url(url);
        let mut controls = current;
        let mut problems = Vec::new();

        if let Some(engine) = params.engine.as_deref() {
            match engine.parse::<EngineId>() {
                Ok(e) => controls.engine = e,
                Err(err) => problems.push(err),
            }
        }
        if let Some(format) = params.format.as_deref() {
            match format.parse::<FormatId>() {
                Ok(f) => controls.format = f,
                Err(err) => problems.push(err),
            }
        }

        let source = if let Some(raw) = params.raw {
            StartupSource::Raw(raw)
        } else if let Some(compressed) = params.compressed {
            StartupSource::Compressed(compressed)
        } else if let Some(remote) = params.url {
            StartupSource::Remote(remote)
        } else if let Some(fragment) = params.fragment {
            StartupSource::Fragment(fragment)
        } else {
            StartupSource::Existing
        };

        Self {
            controls,
            problems,
            presentation: params.presentation,
            source,
        }
    }
}
