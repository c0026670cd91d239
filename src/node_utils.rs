use crate::error::HostError;
use crate::host::{HostNode, NodeKind};
use crate::parser::{parse_html, NodeRef};
use kuchikiki::NodeData;

/// Static-HTML host: a parsed [`NodeRef`] tree with no layout engine behind
/// it.
///
/// * computed style is read from the inline `style` attribute;
/// * box size is known only when both `width` and `height` are given inline;
/// * open declarative shadow roots (`<template shadowrootmode="open">`) are
///   exposed through [`HostNode::shadow_root`];
/// * `srcdoc` frames are parsed on demand; `src` frames have no document.
impl HostNode for NodeRef {
    fn kind(&self) -> NodeKind {
        match self.data() {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Document(_) => NodeKind::Document,
            NodeData::DocumentFragment => NodeKind::Fragment,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self) -> Option<String> {
        self.as_element()
            .map(|e| e.name.local.to_string())
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.as_element()
            .and_then(|e| e.attributes.borrow().get(name).map(|v| v.to_string()))
    }

    fn children(&self) -> Vec<NodeRef> {
        NodeRef::children(self).collect()
    }

    fn parent(&self) -> Option<NodeRef> {
        kuchikiki::Node::parent(self)
    }

    fn text(&self) -> Option<String> {
        self.as_text().map(|t| t.borrow().clone())
    }

    fn shadow_root(&self) -> Option<NodeRef> {
        self.element_children().into_iter().find_map(|child| {
            let e = child.as_element()?;
            if &*e.name.local != "template" {
                return None;
            }
            let mode = {
                let attrs = e.attributes.borrow();
                attrs
                    .get("shadowrootmode")
                    .or_else(|| attrs.get("shadowroot"))
                    .map(|m| m.trim().to_ascii_lowercase())
            };
            if mode.as_deref() == Some("open") {
                e.template_contents.clone()
            } else {
                None
            }
        })
    }

    fn computed_style(&self, property: &str) -> Option<String> {
        inline_style(self, property)
    }

    fn box_size(&self) -> Option<(f64, f64)> {
        let width = inline_style(self, "width").and_then(|v| parse_css_px(&v))?;
        let height = inline_style(self, "height").and_then(|v| parse_css_px(&v))?;
        Some((width, height))
    }

    fn frame_document(&self) -> Result<Option<NodeRef>, HostError> {
        if !matches!(self.tag_name().as_deref(), Some("iframe" | "frame")) {
            return Ok(None);
        }
        Ok(self.attr("srcdoc").map(|srcdoc| parse_html(&srcdoc)))
    }
}

/// Look up a declaration in the node's inline `style` attribute.  The last
/// declaration of a property wins, `!important` is dropped.
pub fn inline_style(node: &NodeRef, property: &str) -> Option<String> {
    let style = node.attr("style")?;
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            if !name.trim().eq_ignore_ascii_case(property) {
                return None;
            }
            let value = value.trim().trim_end_matches("!important").trim();
            Some(value.to_ascii_lowercase())
        })
        .last()
}

fn parse_css_px(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").trim().parse::<f64>().ok()
}
