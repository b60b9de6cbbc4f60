//! LCA Playground core.
//!
//! The host application (browser front end or the `lca` CLI) supplies the
//! editors, a key-value store, a rendering surface and a view, then drives
//! [`controller::Playground`] with user actions.

pub mod archive;
pub mod clock;
pub mod controller;
pub mod editor;
pub mod error;
pub mod platform;
pub mod preferences;
pub mod project;
pub mod relay;
pub mod sandbox;
pub mod store;
pub mod view;

pub use lca_relay_protocol as protocol;

#[cfg(feature = "browser")]
pub use zoon;

pub use controller::Playground;
pub use preferences::{Preferences, Theme};
pub use project::{Project, SourceKind, SourceTexts};
