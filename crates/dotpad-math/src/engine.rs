use crate::Result;
use futures::future::LocalBoxFuture;

/// A TeX → SVG converter (MathJax in the browser playground).
pub trait MathEngine {
    /// Resolves once the engine finished loading. `false` means it is not available at all.
    fn ready(&self) -> LocalBoxFuture<'_, bool>;

    /// Converts one inline expression. The returned markup must contain an `<svg>` element,
    /// either as its root or nested in a wrapper.
    fn tex_to_svg<'a>(&'a self, tex: &'a str) -> LocalBoxFuture<'a, Result<String>>;
}
