//! Rendering surface abstraction.
//!
//! A [`Host`] is whatever document the UI is shown in. It exposes anchors by
//! identifier and creates a [`RenderRoot`] bound to one of them. The entry
//! point only ever asks for [`ANCHOR_ID`].

use crate::app::App;

/// Identifier of the anchor the application mounts into.
pub const ANCHOR_ID: &str = "app";

/// Handle to an element of the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Anchor {
    id: String,
}

impl Anchor {
    /// Anchor with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Anchor identifier.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Document the application is mounted into.
pub trait Host {
    /// Root type produced by [`Host::create_root`].
    type Root: RenderRoot;

    /// Host-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up an anchor by identifier.
    fn find_anchor(&self, id: &str) -> Option<Anchor>;

    /// Create the rendering root bound to `anchor`.
    ///
    /// # Errors
    ///
    /// Hosts reject a second root for an anchor that already has one.
    fn create_root(&mut self, anchor: Anchor) -> Result<Self::Root, Self::Error>;
}

/// Mount point bound to one anchor.
pub trait RenderRoot {
    /// Root-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Anchor this root is bound to.
    fn anchor(&self) -> &Anchor;

    /// Draw the application tree.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;
}
