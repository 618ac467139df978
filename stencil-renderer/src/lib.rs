//! # stencil-renderer
//!
//! Tera-based renderer for the reference document dropped at the root of
//! every session workspace. The document is informational only: it is never
//! synchronized and the watcher ignores it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stencil_core::{Environment, SyncMap};
//! use stencil_renderer::{ReferenceContext, Renderer};
//!
//! fn render(map: &SyncMap) {
//!     let ctx = ReferenceContext::new(Environment::Production, "https://api", "/tmp/ws", map, 1000);
//!     if let Ok(renderer) = Renderer::new() {
//!         if let Ok(doc) = renderer.render(&ctx) {
//!             println!("{} bytes", doc.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{RecordCtx, ReferenceContext};
pub use engine::{Renderer, REFERENCE_DOC_NAME, REFERENCE_TEMPLATE_OVERRIDE};
pub use error::RenderError;
