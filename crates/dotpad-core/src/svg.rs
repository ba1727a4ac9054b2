//! Owned, mutable SVG document tree.
//!
//! Compiler output is parsed once with `roxmltree` and copied into [`SvgElement`] nodes that can
//! be edited in place (math typesetting swaps `<text>` nodes for groups) and serialized back to
//! markup for downloads, raw display and rasterization.

use crate::{Error, Result};
use std::fmt::Write as _;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgNode {
    Element(SvgElement),
    Text(String),
    Comment(String),
}

/// One element. Names are kept qualified (`xlink:href`), namespace declarations are kept only on
/// the element that introduced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub namespaces: Vec<(Option<String>, String)>,
    pub children: Vec<SvgNode>,
}

/// Index path from the root element through `children` vectors.
pub type NodePath = Vec<usize>;

impl SvgElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Local part of the element name.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(idx).1)
    }

    pub fn push_child(&mut self, node: SvgNode) {
        self.children.push(node);
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &SvgElement> {
        self.children.iter().filter_map(|c| match c {
            SvgNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes (DOM `textContent`).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Paths of all descendant elements (including `self` as the empty path) matching `pred`,
    /// in document order.
    pub fn find_paths(&self, pred: &dyn Fn(&SvgElement) -> bool) -> Vec<NodePath> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        find_paths_rec(self, pred, &mut path, &mut out);
        out
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&SvgElement> {
        let mut cur = self;
        for &i in path {
            cur = match cur.children.get(i)? {
                SvgNode::Element(e) => e,
                _ => return None,
            };
        }
        Some(cur)
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut SvgElement> {
        let mut cur = self;
        for &i in path {
            cur = match cur.children.get_mut(i)? {
                SvgNode::Element(e) => e,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Replaces the node at `path` (which must not be empty) and returns the previous node.
    pub fn replace_at(&mut self, path: &[usize], node: SvgNode) -> Option<SvgNode> {
        let (last, parent_path) = path.split_last()?;
        let parent = self.element_at_mut(parent_path)?;
        let slot = parent.children.get_mut(*last)?;
        Some(std::mem::replace(slot, node))
    }

    pub fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (prefix, uri) in &self.namespaces {
            match prefix {
                Some(p) => {
                    let _ = write!(out, " xmlns:{p}=\"");
                }
                None => out.push_str(" xmlns=\""),
            }
            escape_attr(uri, out);
            out.push('"');
        }
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_attr(v, out);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                SvgNode::Element(e) => e.write_markup(out),
                SvgNode::Text(t) => escape_text(t, out),
                SvgNode::Comment(c) => {
                    out.push_str("<!--");
                    out.push_str(c);
                    out.push_str("-->");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    /// Parses markup with an arbitrary root element (e.g. a math engine's wrapper around its
    /// `<svg>`).
    pub fn parse_fragment(markup: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(markup).map_err(|e| Error::SvgParse {
            message: e.to_string(),
        })?;
        Ok(build_element(doc.root_element()))
    }

    /// First element (self included) with the given local name, in document order.
    pub fn find_first(&self, local_name: &str) -> Option<&SvgElement> {
        if self.local_name() == local_name {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find_first(local_name))
    }
}

fn collect_text(e: &SvgElement, out: &mut String) {
    for c in &e.children {
        match c {
            SvgNode::Element(child) => collect_text(child, out),
            SvgNode::Text(t) => out.push_str(t),
            SvgNode::Comment(_) => {}
        }
    }
}

fn find_paths_rec(
    e: &SvgElement,
    pred: &dyn Fn(&SvgElement) -> bool,
    path: &mut NodePath,
    out: &mut Vec<NodePath>,
) {
    if pred(e) {
        out.push(path.clone());
    }
    for (i, c) in e.children.iter().enumerate() {
        if let SvgNode::Element(child) = c {
            path.push(i);
            find_paths_rec(child, pred, path, out);
            path.pop();
        }
    }
}

fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(ch),
        }
    }
}

/// A parsed vector image. Only the document element is kept, as a browser serializer would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    root: SvgElement,
}

impl SvgDocument {
    /// Parses SVG markup. DOCTYPE declarations (Graphviz emits one) are accepted.
    pub fn parse(markup: &str) -> Result<Self> {
        let opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(markup, opt).map_err(|e| {
            Error::SvgParse {
                message: e.to_string(),
            }
        })?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(Error::SvgParse {
                message: format!("expected <svg> root, found <{}>", root.tag_name().name()),
            });
        }
        Ok(Self {
            root: build_element(root),
        })
    }

    pub fn from_root(root: SvgElement) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SvgElement {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut SvgElement {
        &mut self.root
    }

    pub fn into_root(self) -> SvgElement {
        self.root
    }

    pub fn to_markup(&self) -> String {
        self.root.to_markup()
    }
}

impl std::fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_markup())
    }
}

fn prefix_for(n: roxmltree::Node<'_, '_>, uri: &str, allow_default: bool) -> Option<String> {
    if uri == XML_NS {
        return Some("xml".to_string());
    }
    let mut named = None;
    for ns in n.namespaces() {
        if ns.uri() != uri {
            continue;
        }
        match ns.name() {
            None if allow_default => return None,
            Some(p) if named.is_none() => named = Some(p.to_string()),
            _ => {}
        }
    }
    named.or_else(|| (uri == XLINK_NS).then(|| "xlink".to_string()))
}

fn qualify(prefix: Option<String>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    }
}

fn build_element(n: roxmltree::Node<'_, '_>) -> SvgElement {
    let tag = n.tag_name();
    let prefix = tag.namespace().and_then(|uri| prefix_for(n, uri, true));
    let mut el = SvgElement::new(qualify(prefix, tag.name()));

    let inherited: Vec<(Option<&str>, &str)> = n
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in n.namespaces() {
        if ns.uri() == XML_NS || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        el.namespaces
            .push((ns.name().map(str::to_string), ns.uri().to_string()));
    }

    for a in n.attributes() {
        let prefix = a.namespace().and_then(|uri| prefix_for(n, uri, false));
        el.attrs
            .push((qualify(prefix, a.name()), a.value().to_string()));
    }

    for c in n.children() {
        if c.is_element() {
            el.children.push(SvgNode::Element(build_element(c)));
        } else if c.is_text() {
            if let Some(t) = c.text() {
                el.children.push(SvgNode::Text(t.to_string()));
            }
        } else if c.is_comment() {
            if let Some(t) = c.text() {
                el.children.push(SvgNode::Comment(t.to_string()));
            }
        }
    }
    el
}
