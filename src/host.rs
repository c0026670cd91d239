use crate::error::HostError;

/// The coarse node categories the extractor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The root of a document (or of a frame's document).
    Document,
    /// A document fragment, e.g. the root of a shadow tree.
    Fragment,
    Element,
    Text,
    /// Comments, doctypes, processing instructions.
    Other,
}

/// Read-only access to a host-owned document tree.
///
/// The extractor is a pure function of this capability: it never mutates the
/// tree and only asks for what is listed here.  [`kuchikiki::NodeRef`]
/// implements it for static HTML (see [`crate::parser`]); a browser binding
/// can implement it over live DOM handles.
///
/// Equality must be node identity, not structural equality.
pub trait HostNode: Clone + PartialEq + Sized {
    fn kind(&self) -> NodeKind;

    /// Lower-case local tag name for elements, `None` for everything else.
    fn tag_name(&self) -> Option<String>;

    /// Attribute value by name, `None` when absent or not an element.
    fn attr(&self, name: &str) -> Option<String>;

    /// All direct children (elements, text and other nodes) in tree order.
    fn children(&self) -> Vec<Self>;

    fn parent(&self) -> Option<Self>;

    /// Character data of a text node.
    fn text(&self) -> Option<String>;

    /// The root of an open shadow tree attached to this element, if any.
    fn shadow_root(&self) -> Option<Self>;

    /// Computed value of a CSS property (`display`, `visibility`,
    /// `overflow`, ...), `None` when the host cannot tell.
    fn computed_style(&self, property: &str) -> Option<String>;

    /// Rendered `(width, height)`, `None` when the host has no layout.
    fn box_size(&self) -> Option<(f64, f64)>;

    /// The document of an embedded frame.  `Ok(None)` when there is no
    /// loaded document, `Err(HostError::AccessDenied)` when the host refuses
    /// inspection.
    fn frame_document(&self) -> Result<Option<Self>, HostError>;

    fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    fn is_text(&self) -> bool {
        self.kind() == NodeKind::Text
    }

    fn has_tag(&self, name: &str) -> bool {
        self.tag_name().as_deref() == Some(name)
    }

    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// The first token of the `role` attribute, lower-cased.
    fn role(&self) -> Option<String> {
        self.attr("role")
            .and_then(|r| r.split_whitespace().next().map(str::to_lowercase))
    }

    fn element_children(&self) -> Vec<Self> {
        self.children()
            .into_iter()
            .filter(|c| c.is_element())
            .collect()
    }
}
