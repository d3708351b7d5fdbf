//! Social-network frame integration.
//!
//! `context` talks to the host at runtime; `manifest` produces the static
//! metadata the host reads before launching the app.

pub mod context;
pub mod manifest;

pub use context::{FrameContext, FrameError, FrameHost, FrameSession, FrameUser, HttpFrameHost};
pub use manifest::{FrameEmbed, FrameManifest};
