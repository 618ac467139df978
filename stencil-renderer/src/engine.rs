//! Tera rendering engine: [`Renderer`].

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::ReferenceContext;
use crate::error::RenderError;

/// File name of the reference document at the workspace root.
pub const REFERENCE_DOC_NAME: &str = "STENCIL.md";

/// File name a user can drop in `~/.stencil/` to replace the embedded template.
pub const REFERENCE_TEMPLATE_OVERRIDE: &str = "reference.md.tera";

const TEMPLATE_NAME: &str = "reference.md";
const EMBEDDED_TEMPLATE: &str = include_str!("templates/reference.md.tera");

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

fn load_override(dir: &Path) -> Result<Option<String>, RenderError> {
    let path = dir.join(REFERENCE_TEMPLATE_OVERRIDE);
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Renders the reference document. Create once and reuse.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Construct a [`Renderer`] with the embedded template.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_override_dir(None)
    }

    /// Construct a [`Renderer`], preferring `<dir>/reference.md.tera` when it
    /// exists.
    pub fn with_override_dir(dir: Option<&Path>) -> Result<Self, RenderError> {
        let source = match dir {
            Some(dir) => load_override(dir)?.unwrap_or_else(|| EMBEDDED_TEMPLATE.to_string()),
            None => EMBEDDED_TEMPLATE.to_string(),
        };
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, &source)?;
        Ok(Renderer { tera })
    }

    pub fn render(&self, ctx: &ReferenceContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(TEMPLATE_NAME, &tera_ctx)?)
    }
}
