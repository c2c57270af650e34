use std::sync::Arc;

pub mod markdown;
pub mod model;

pub use markdown::MarkdownBackend;
pub use model::Rendered;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("no markup rendering backend is available")]
    BackendMissing,
}

/// Converts raw markup into a [`Rendered`] document. Must be deterministic.
pub trait MarkupBackend: Send + Sync {
    fn render(&self, content: &str) -> Rendered;
}

/// Front door to the configured backend.
///
/// Without a backend, rendering degrades to an empty result unless `strict`.
#[derive(Clone)]
pub struct Renderer {
    backend: Option<Arc<dyn MarkupBackend>>,
    strict: bool,
}

impl Renderer {
    pub fn new(backend: Option<Arc<dyn MarkupBackend>>, strict: bool) -> Self {
        Self { backend, strict }
    }

    pub fn markdown(strict: bool) -> Self {
        Self::new(Some(Arc::new(MarkdownBackend::default())), strict)
    }

    /// Picks a backend by its configured name; unknown names count as missing.
    pub fn from_name(name: &str, strict: bool) -> Self {
        match name {
            "markdown" | "commonmark" => Self::markdown(strict),
            other => {
                tracing::warn!("Markup backend '{}' is not available", other);
                Self::new(None, strict)
            }
        }
    }

    pub fn render(&self, content: &str) -> Result<Rendered, RenderError> {
        match &self.backend {
            Some(backend) => Ok(backend.render(content)),
            None if self.strict => Err(RenderError::BackendMissing),
            None => Ok(Rendered::default()),
        }
    }
}
