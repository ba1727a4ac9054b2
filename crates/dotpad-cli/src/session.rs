//! In-memory stand-ins for the editor and address bar, plus the HTTP fetcher.

use dotpad::HistoryEntry;
use dotpad::host::{AddressBar, ContentFetcher, FetchError, FetchResponse, TextSource};
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use url::Url;

#[derive(Debug, Default)]
pub struct Buffer {
    text: RefCell<String>,
}

impl Buffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: RefCell::new(text.into()),
        }
    }
}

impl TextSource for Buffer {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }
}

/// Address bar without a browser: pushed entries only move the location.
#[derive(Debug)]
pub struct Address {
    location: RefCell<Url>,
}

impl Address {
    pub fn new(location: Url) -> Self {
        Self {
            location: RefCell::new(location),
        }
    }
}

impl AddressBar for Address {
    fn location(&self) -> Url {
        self.location.borrow().clone()
    }

    fn push_state(&self, entry: &HistoryEntry, url: &Url) {
        tracing::debug!(%url, engine = %entry.engine, "history entry pushed");
        *self.location.borrow_mut() = url.clone();
    }
}

/// Blocking HTTP fetcher for `url=` sources.
#[derive(Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let to_fetch_error = |err: reqwest::Error| FetchError {
            message: err.to_string(),
        };
        let response = self.client.get(url).send().map_err(to_fetch_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(to_fetch_error)?;
        tracing::debug!(url, status, bytes = body.len(), "remote source fetched");
        Ok(FetchResponse { status, body })
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>> {
        futures::future::ready(self.get(url)).boxed_local()
    }
}
