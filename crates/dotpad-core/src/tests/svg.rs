use super::*;

const GRAPHVIZ_SVG: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN"
 "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<!-- Generated by graphviz -->
<svg width="62pt" height="44pt" viewBox="0.00 0.00 62.00 44.00" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<g id="graph0" class="graph" transform="scale(1 1) rotate(0) translate(4 40)">
<title>G</title>
<!-- a -->
<g id="node1" class="node">
<a xlink:href="https://example.com" xlink:title="a &amp; b">
<text text-anchor="middle" x="27" y="-14.3" font-size="14.00">a &lt; b</text>
</a>
</g>
</g>
</svg>
"#;

#[test]
fn parses_graphviz_output_with_doctype() {
    let doc = SvgDocument::parse(GRAPHVIZ_SVG).unwrap();
    let root = doc.root();
    assert_eq!(root.name, "svg");
    assert_eq!(root.attr("viewBox"), Some("0.00 0.00 62.00 44.00"));

    let texts = root.find_paths(&|e| e.local_name() == "text");
    assert_eq!(texts.len(), 1);
    let text = root.element_at(&texts[0]).unwrap();
    assert_eq!(text.text_content(), "a < b");
}

#[test]
fn serializes_namespaces_once_and_escapes() {
    let doc = SvgDocument::parse(GRAPHVIZ_SVG).unwrap();
    let markup = doc.to_markup();
    assert!(markup.starts_with("<svg xmlns"));
    assert!(markup.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    assert_eq!(markup.matches("xmlns=").count(), 1);
    assert_eq!(markup.matches(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#).count(), 1);
    assert!(markup.contains(r#"xlink:href="https://example.com""#));
    assert!(markup.contains(r#"xlink:title="a &amp; b""#));
    assert!(markup.contains(">a &lt; b</text>"));
    assert!(markup.contains("<!-- a -->"));

    // Serialized output parses back to the same tree.
    assert_eq!(SvgDocument::parse(&markup).unwrap(), doc);
}

#[test]
fn replace_at_swaps_a_node_in_place() {
    let mut doc = SvgDocument::parse(GRAPHVIZ_SVG).unwrap();
    let path = doc.root().find_paths(&|e| e.local_name() == "text").remove(0);

    let mut g = SvgElement::new("g");
    g.set_attr("transform", "scale(2)");
    let old = doc.root_mut().replace_at(&path, SvgNode::Element(g)).unwrap();
    assert!(matches!(old, SvgNode::Element(ref e) if e.name == "text"));

    assert!(doc.root().find_paths(&|e| e.local_name() == "text").is_empty());
    assert_eq!(
        doc.root().element_at(&path).and_then(|e| e.attr("transform")),
        Some("scale(2)")
    );
}

#[test]
fn rejects_non_svg_roots_and_garbage() {
    let err = SvgDocument::parse("<html/>").unwrap_err();
    assert!(err.to_string().contains("expected <svg> root"));
    assert!(SvgDocument::parse("<svg><g></svg>").is_err());
}
