//! Defines the [DocumentNode] struct, a positioned and styled visual tree that can be
//! rasterized into a single image.

use crate::bitmap::{PixelRect, TextAlignment};
use image_025::RgbaImage;

/// Where the pixels of an image node were loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Produced locally, e.g. the content of an ink surface.
    SameOrigin,

    /// Loaded from another origin. Including it in a capture taints the output unless
    /// the capture policy allows it.
    CrossOrigin,
}

/// The content painted inside a node, on top of its background and border.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Empty,

    /// A single line of text, vertically centered in the node.
    Text {
        text: String,
        font_size: f32,
        alignment: TextAlignment,
    },

    /// An image scaled to fill the node.
    Image {
        image: RgbaImage,
        origin: ImageOrigin,
    },
}

/// The computed color styles of a node, as CSS color strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
    pub border_width: f32,
}

/// A single element of a visual tree. Each node's bounds are relative to its parent's
/// top-left corner; the root's own position is ignored when capturing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    name: String,
    bounds: PixelRect,
    style: NodeStyle,
    content: NodeContent,
    children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Creates a new, unstyled [DocumentNode] with no content and no children.
    pub fn new(name: impl Into<String>, bounds: PixelRect) -> Self {
        Self {
            name: name.into(),
            bounds,
            style: NodeStyle::default(),
            content: NodeContent::Empty,
            children: Vec::new(),
        }
    }

    /// Sets the text color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.style.color = Some(color.into());
        self
    }

    /// Sets the background color.
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.style.background_color = Some(color.into());
        self
    }

    /// Sets the border color and width.
    pub fn with_border(mut self, color: impl Into<String>, width: f32) -> Self {
        self.style.border_color = Some(color.into());
        self.style.border_width = width;
        self
    }

    /// Sets the content to a single line of text.
    pub fn with_text(mut self, text: impl Into<String>, font_size: f32, alignment: TextAlignment) -> Self {
        self.content = NodeContent::Text {
            text: text.into(),
            font_size,
            alignment,
        };
        self
    }

    /// Sets the content to an image.
    pub fn with_image(mut self, image: RgbaImage, origin: ImageOrigin) -> Self {
        self.content = NodeContent::Image { image, origin };
        self
    }

    /// Appends a child node.
    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the name of this node, used in log output.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    #[inline]
    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    #[inline]
    pub fn style_mut(&mut self) -> &mut NodeStyle {
        &mut self.style
    }

    #[inline]
    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    #[inline]
    pub fn children(&self) -> &[DocumentNode] {
        &self.children
    }

    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<DocumentNode> {
        &mut self.children
    }

    /// Returns the first node in this subtree, depth first, with the given name.
    pub fn find(&self, name: &str) -> Option<&DocumentNode> {
        if self.name == name {
            return Some(self);
        }

        self.children.iter().find_map(|child| child.find(name))
    }

    /// Returns the number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DocumentNode::node_count).sum::<usize>()
    }
}
