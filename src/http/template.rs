//! HTML page rendering.

use std::path::Path;

use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

use crate::http::response::IdentityResponse;

const BUILTIN_NAME: &str = "index.html";
const BUILTIN_SOURCE: &str = include_str!("../../templates/index.html");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),
}

/// Values available to the page template.
#[derive(Debug, Serialize)]
pub struct Page<'a> {
    #[serde(flatten)]
    pub response: &'a IdentityResponse,
    pub host: &'a str,
    /// Pretty-printed identity document.
    pub json: String,
    /// Whether `/port/` is served.
    pub port: bool,
}

/// Renders the browser page.
pub trait PageRenderer: Send + Sync {
    fn render(&self, page: &Page<'_>) -> Result<String, TemplateError>;
}

/// Jinja-style template held in memory.
///
/// The name decides auto-escaping, so it should end in `.html`.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    name: String,
    source: String,
}

impl TemplateRenderer {
    /// Compile `source` once to surface syntax errors early.
    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Result<Self, TemplateError> {
        let renderer = Self {
            name: name.into(),
            source: source.into(),
        };
        Environment::new().template_from_named_str(&renderer.name, &renderer.source)?;
        Ok(renderer)
    }

    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| BUILTIN_NAME.to_string());
        let renderer = Self::from_source(name, source)?;
        tracing::info!(path = %path.display(), "Template loaded");
        Ok(renderer)
    }

    /// The page shipped with the binary.
    pub fn builtin() -> Self {
        Self {
            name: BUILTIN_NAME.to_string(),
            source: BUILTIN_SOURCE.to_string(),
        }
    }
}

impl PageRenderer for TemplateRenderer {
    fn render(&self, page: &Page<'_>) -> Result<String, TemplateError> {
        let env = Environment::new();
        let template = env.template_from_named_str(&self.name, &self.source)?;
        Ok(template.render(page)?)
    }
}
