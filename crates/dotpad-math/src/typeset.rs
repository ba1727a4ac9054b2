use crate::delimiters::extract_first;
use crate::engine::MathEngine;
use crate::geometry::{Placement, Rect, embedded_svg_bbox, font_size_of, text_bbox};
use crate::text::TextMeasurer;
use crate::{Error, Result};
use dotpad_core::svg::NodePath;
use dotpad_core::{SvgDocument, SvgElement, SvgNode};
use std::sync::Arc;

/// A `<text>` node holding delimited math, found during one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MathSpan {
    pub path: NodePath,
    pub tex: String,
    pub bbox: Rect,
    pub font_size: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypesetReport {
    /// Spans replaced by typeset math.
    pub typeset: usize,
    /// Spans left as text because their expression failed to convert.
    pub skipped: usize,
}

/// Replaces delimited math in `<text>` labels with engine-rendered SVG, scaled to the label's
/// height and centered on it.
#[derive(Clone)]
pub struct MathTypesetter {
    measurer: Arc<dyn TextMeasurer>,
}

impl MathTypesetter {
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        Self { measurer }
    }

    /// Finds every span of the current image. Labels with a blank expression are ignored.
    pub fn collect_spans(&self, doc: &SvgDocument) -> Vec<MathSpan> {
        let root = doc.root();
        root.find_paths(&|e| e.local_name() == "text")
            .into_iter()
            .filter_map(|path| {
                let el = root.element_at(&path)?;
                let content = el.text_content();
                let tex = extract_first(&content)?.tex;
                if tex.is_empty() {
                    return None;
                }
                Some(MathSpan {
                    tex: tex.to_string(),
                    bbox: text_bbox(el, self.measurer.as_ref()),
                    font_size: font_size_of(el),
                    path,
                })
            })
            .collect()
    }

    /// Runs one pass over `doc`.
    ///
    /// Nothing is touched when the engine is unavailable ([`Error::EngineUnavailable`]). A span
    /// whose own conversion fails stays as plain text and the pass continues. Running the pass on
    /// an already-typeset image finds no spans and changes nothing.
    pub async fn typeset(
        &self,
        engine: &dyn MathEngine,
        doc: &mut SvgDocument,
    ) -> Result<TypesetReport> {
        let spans = self.collect_spans(doc);
        let mut report = TypesetReport::default();
        if spans.is_empty() {
            return Ok(report);
        }
        if !engine.ready().await {
            return Err(Error::EngineUnavailable);
        }

        for span in spans {
            let group = match self.render_span(engine, &span).await {
                Ok(g) => g,
                Err(err) => {
                    tracing::warn!(tex = %span.tex, error = %err, "leaving math label as text");
                    report.skipped += 1;
                    continue;
                }
            };
            // Spans are replaced one-for-one, so sibling paths stay valid. A text node nested in
            // an already-replaced one is gone with it.
            match doc.root_mut().replace_at(&span.path, SvgNode::Element(group)) {
                Some(_) => report.typeset += 1,
                None => report.skipped += 1,
            }
        }
        tracing::debug!(
            typeset = report.typeset,
            skipped = report.skipped,
            "math typesetting pass finished"
        );
        Ok(report)
    }

    async fn render_span(&self, engine: &dyn MathEngine, span: &MathSpan) -> Result<SvgElement> {
        let markup = engine.tex_to_svg(&span.tex).await?;
        let wrapper = SvgElement::parse_fragment(&markup)?;
        let svg = wrapper
            .find_first("svg")
            .cloned()
            .ok_or_else(|| Error::Conversion {
                tex: span.tex.clone(),
                message: "engine output has no <svg> element".to_string(),
            })?;

        // Measured as the group's only child, positioned where the text node was.
        let rendered = embedded_svg_bbox(&svg, span.font_size);
        let placement = Placement::fit(span.bbox, rendered);

        let mut group = SvgElement::new("g");
        group.set_attr("class", "math");
        group.set_attr("transform", placement.to_transform());
        group.push_child(SvgNode::Element(svg));
        Ok(group)
    }
}
