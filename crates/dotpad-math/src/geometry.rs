#![forbid(unsafe_code)]

use crate::text::{TextMeasurer, TextStyle};
use dotpad_core::SvgElement;
use std::str::FromStr;

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    euclid::rect(x, y, width, height)
}

/// Font size used when a text element carries none (the SVG user-agent default).
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Converts an SVG length to user units. `em`/`ex` resolve against `font_size`; percentages have
/// no viewport here and yield `None`.
pub fn length_to_user(length: svgtypes::Length, font_size: f64) -> Option<f64> {
    use svgtypes::LengthUnit;
    let n = length.number;
    let v = match length.unit {
        LengthUnit::None | LengthUnit::Px => n,
        LengthUnit::Em => n * font_size,
        LengthUnit::Ex => n * font_size / 2.0,
        LengthUnit::Pt => n * 4.0 / 3.0,
        LengthUnit::Pc => n * 16.0,
        LengthUnit::In => n * 96.0,
        LengthUnit::Cm => n * 96.0 / 2.54,
        LengthUnit::Mm => n * 96.0 / 25.4,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Parses a length attribute. Coordinate lists (`x="1 2 3"`) use their first entry.
pub fn attr_length(el: &SvgElement, name: &str, font_size: f64) -> Option<f64> {
    let raw = el.attr(name)?;
    let first = raw.split([' ', ',']).find(|s| !s.is_empty())?;
    let length = svgtypes::Length::from_str(first).ok()?;
    length_to_user(length, font_size)
}

pub fn font_size_of(el: &SvgElement) -> f64 {
    attr_length(el, "font-size", DEFAULT_FONT_SIZE)
        .filter(|v| *v > 0.0)
        .unwrap_or(DEFAULT_FONT_SIZE)
}

/// Bounding box of a `<text>` element in its own user space.
///
/// The box is the measured line box placed by `text-anchor` around `x` and by the measurer's
/// ascent around the baseline `y`.
pub fn text_bbox(el: &SvgElement, measurer: &dyn TextMeasurer) -> Rect {
    let font_size = font_size_of(el);
    let style = TextStyle {
        font_family: el.attr("font-family").map(str::to_string),
        font_size,
    };
    let metrics = measurer.measure(&el.text_content(), &style);

    let x = attr_length(el, "x", font_size).unwrap_or(0.0);
    let baseline = attr_length(el, "y", font_size).unwrap_or(0.0);
    let left = match el.attr("text-anchor").map(str::trim) {
        Some("middle") => x - metrics.width / 2.0,
        Some("end") => x - metrics.width,
        _ => x,
    };
    let top = baseline - metrics.height * measurer.ascent_ratio();
    rect(left, top, metrics.width, metrics.height)
}

/// Bounding box of an embedded `<svg>` viewport: `x`/`y` offsets and `width`/`height`, falling
/// back to the `viewBox` size (keeping its aspect ratio when only one side is given).
pub fn embedded_svg_bbox(svg: &SvgElement, font_size: f64) -> Rect {
    let x = attr_length(svg, "x", font_size).unwrap_or(0.0);
    let y = attr_length(svg, "y", font_size).unwrap_or(0.0);
    let view_box = svg
        .attr("viewBox")
        .and_then(|v| svgtypes::ViewBox::from_str(v).ok())
        .filter(|vb| vb.w > 0.0 && vb.h > 0.0);

    let width = attr_length(svg, "width", font_size);
    let height = attr_length(svg, "height", font_size);
    let (w, h) = match (width, height, view_box) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some(vb)) => (w, w * vb.h / vb.w),
        (None, Some(h), Some(vb)) => (h * vb.w / vb.h, h),
        (None, None, Some(vb)) => (vb.w, vb.h),
        (w, h, None) => (w.unwrap_or(0.0), h.unwrap_or(0.0)),
    };
    rect(x, y, w.max(0.0), h.max(0.0))
}

/// Uniform scale and translation mapping `rendered` onto `original`'s height and center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Placement {
    pub fn fit(original: Rect, rendered: Rect) -> Self {
        let scale = if rendered.size.height == 0.0 {
            1.0
        } else {
            original.size.height / rendered.size.height
        };
        let oc = original.center();
        let rc = rendered.center();
        Self {
            scale,
            tx: oc.x - scale * rc.x,
            ty: oc.y - scale * rc.y,
        }
    }

    pub fn to_transform(self) -> String {
        format!("translate({} {}) scale({})", self.tx, self.ty, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DeterministicTextMeasurer;

    fn el(name: &str, attrs: &[(&str, &str)]) -> SvgElement {
        let mut e = SvgElement::new(name);
        for (k, v) in attrs {
            e.set_attr(k, *v);
        }
        e
    }

    #[test]
    fn lengths_resolve_units() {
        let e = el("svg", &[("width", "2ex"), ("height", "1.5em"), ("x", "3pt")]);
        assert_eq!(attr_length(&e, "width", 10.0), Some(10.0));
        assert_eq!(attr_length(&e, "height", 10.0), Some(15.0));
        assert_eq!(attr_length(&e, "x", 10.0), Some(4.0));
        let e = el("text", &[("x", "12 20 30"), ("width", "50%")]);
        assert_eq!(attr_length(&e, "x", 10.0), Some(12.0));
        assert_eq!(attr_length(&e, "width", 10.0), None);
    }

    #[test]
    fn text_box_honors_anchor_and_baseline() {
        let measurer = DeterministicTextMeasurer {
            advance: 0.5,
            line_height: 1.0,
        };
        let mut t = el(
            "text",
            &[("x", "100"), ("y", "50"), ("font-size", "10.00"), ("text-anchor", "middle")],
        );
        t.push_child(dotpad_core::SvgNode::Text("abcd".to_string()));

        let b = text_bbox(&t, &measurer);
        assert_eq!(b, rect(90.0, 42.0, 20.0, 10.0));

        t.set_attr("text-anchor", "end");
        assert_eq!(text_bbox(&t, &measurer).origin.x, 80.0);
        t.remove_attr("text-anchor");
        assert_eq!(text_bbox(&t, &measurer).origin.x, 100.0);
    }

    #[test]
    fn embedded_svg_box_falls_back_to_view_box() {
        let s = el("svg", &[("viewBox", "0 -750 1000 1000"), ("height", "20")]);
        assert_eq!(embedded_svg_bbox(&s, 10.0), rect(0.0, 0.0, 20.0, 20.0));

        let s = el("svg", &[("viewBox", "0 0 40 10")]);
        assert_eq!(embedded_svg_bbox(&s, 10.0), rect(0.0, 0.0, 40.0, 10.0));

        let s = el("svg", &[]);
        assert_eq!(embedded_svg_bbox(&s, 10.0).size.height, 0.0);
    }

    #[test]
    fn placement_halves_a_double_height_rendering() {
        let original = rect(10.0, 20.0, 30.0, 10.0);
        let rendered = rect(0.0, 0.0, 40.0, 20.0);
        let p = Placement::fit(original, rendered);
        assert_eq!(p.scale, 0.5);
        // Centers: original (25, 25), rendered (20, 10).
        assert_eq!((p.tx, p.ty), (15.0, 20.0));
        assert_eq!(p.to_transform(), "translate(15 20) scale(0.5)");
    }

    #[test]
    fn zero_height_rendering_keeps_scale_one() {
        let p = Placement::fit(rect(0.0, 0.0, 10.0, 10.0), rect(2.0, 2.0, 0.0, 0.0));
        assert_eq!(p.scale, 1.0);
        assert_eq!((p.tx, p.ty), (3.0, 3.0));
    }
}
