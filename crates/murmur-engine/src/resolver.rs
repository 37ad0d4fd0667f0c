//! Engine-side wrapper around a [`TextGenerator`].

use std::sync::Arc;

use murmur_core::PlayState;
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::event::OfferedChoice;
use crate::generator::TextGenerator;
use crate::prompt::state_summary;

/// Maps free text onto offered choices and substitutes generated lines.
#[derive(Clone)]
pub struct ResponseResolver {
    generator: Arc<dyn TextGenerator>,
}

impl ResponseResolver {
    /// Resolve through `generator`.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generated text for a node, or the authored `fallback` on any failure.
    pub async fn substitute(&self, hint: &str, fallback: &str, state: &PlayState) -> String {
        let summary = state_summary(state);
        match self.generator.generate(hint, fallback, &summary).await {
            Ok(Some(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback.to_string(),
            Err(e) => {
                warn!(error = %e, "text generation failed, using authored text");
                fallback.to_string()
            }
        }
    }

    /// The offered choice `text` maps to, if any.
    ///
    /// Ids outside `offered` are treated as no match.
    pub async fn resolve(
        &self,
        text: &str,
        offered: &[OfferedChoice],
        state: &PlayState,
    ) -> Result<Option<String>, GenerationError> {
        if offered.is_empty() {
            return Ok(None);
        }
        let summary = state_summary(state);
        let resolved = self
            .generator
            .resolve_choice(text, offered, &summary)
            .await?;

        Ok(resolved.filter(|id| {
            let known = offered.iter().any(|c| &c.id == id);
            if !known {
                debug!(choice = %id, "generator returned an id that was not offered");
            }
            known
        }))
    }
}

impl std::fmt::Debug for ResponseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseResolver").finish_non_exhaustive()
    }
}
