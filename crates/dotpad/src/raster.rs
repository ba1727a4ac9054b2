#![forbid(unsafe_code)]

//! PNG output through `usvg` + `resvg`, standing in for the browser's canvas round trip.

use crate::host::{RasterImage, Rasterizer};
use dotpad_core::SvgDocument;
use dotpad_math::geometry::{DEFAULT_FONT_SIZE, embedded_svg_bbox};

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("SVG has no usable size")]
    EmptyImage,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Device pixel ratio: the pixmap is the intrinsic size times this.
    pub scale: f32,
    pub background: Option<String>,
    pub load_system_fonts: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            load_system_fonts: true,
        }
    }
}

/// Rasterizes SVG markup into a PNG of `intrinsic size × scale` pixels.
pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<RasterImage> {
    let (pixmap, width, height) = svg_to_pixmap(svg, options)?;
    let png = pixmap.encode_png().map_err(|_| RasterError::PngEncode)?;
    Ok(RasterImage { png, width, height })
}

/// Intrinsic size of the root `<svg>` in CSS pixels, as an `<img>` would report it: the
/// `width`/`height` attributes, falling back to the `viewBox`.
pub fn intrinsic_size(svg: &str) -> Option<(f32, f32)> {
    let doc = SvgDocument::parse(svg).ok()?;
    let bbox = embedded_svg_bbox(doc.root(), DEFAULT_FONT_SIZE);
    let (w, h) = (bbox.size.width, bbox.size.height);
    (w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0).then_some((w as f32, h as f32))
}

fn svg_to_pixmap(svg: &str, options: &RasterOptions) -> Result<(tiny_skia::Pixmap, u32, u32)> {
    let mut opt = usvg::Options::default();
    if options.load_system_fonts {
        opt.fontdb_mut().load_system_fonts();
    }
    // Graphviz labels default to Times; keep a serif fallback when it is not installed.
    opt.font_family = "Times New Roman".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    let (width, height) = match intrinsic_size(svg) {
        Some(size) => size,
        None => {
            let size = tree.size();
            (size.width(), size.height())
        }
    };
    if !(width > 0.0 && height > 0.0) {
        return Err(RasterError::EmptyImage);
    }

    let scale = options.scale;
    let width_px = (width * scale).ceil().max(1.0) as u32;
    let height_px = (height * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;

    if let Some(color) = options.background.as_deref().and_then(parse_tiny_skia_color) {
        pixmap.fill(color);
    }

    // The tree is laid out at its own size; stretch it over the intrinsic box like
    // `drawImage(img, 0, 0, w * ratio, h * ratio)`.
    let tree_size = tree.size();
    let sx = width * scale / tree_size.width();
    let sy = height * scale / tree_size.height();
    resvg::render(&tree, tiny_skia::Transform::from_scale(sx, sy), &mut pixmap.as_mut());

    Ok((pixmap, width.round().max(1.0) as u32, height.round().max(1.0) as u32))
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    let digit = |c: u8| (c as char).to_digit(16).map(|v| v as u8);
    let bytes = hex.as_bytes();
    let channels: Vec<u8> = match bytes.len() {
        3 | 4 => bytes
            .iter()
            .map(|&c| digit(c).map(|v| (v << 4) | v))
            .collect::<Option<_>>()?,
        6 | 8 => bytes
            .chunks_exact(2)
            .map(|p| Some((digit(p[0])? << 4) | digit(p[1])?))
            .collect::<Option<_>>()?,
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(tiny_skia::Color::from_rgba8(
        channels[0],
        channels[1],
        channels[2],
        alpha,
    ))
}

/// [`Rasterizer`] backed by `resvg`.
#[derive(Debug, Clone, Default)]
pub struct ResvgRasterizer {
    pub background: Option<String>,
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, pixel_ratio: f32) -> crate::Result<RasterImage> {
        let options = RasterOptions {
            scale: pixel_ratio,
            background: self.background.clone(),
            ..RasterOptions::default()
        };
        Ok(svg_to_png(svg, &options)?)
    }
}
