//! The text-generation boundary.
//!
//! [`TextGenerator`] is what the engine consumes. [`LanguageModel`] is the
//! lower-level plug point for a concrete completion backend;
//! [`PromptedGenerator`] turns one into the other.

use async_trait::async_trait;
use murmur_core::StoryGraph;

use crate::error::GenerationError;
use crate::event::OfferedChoice;
use crate::prompt;

/// Produces replacement text and maps free text onto choices.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a line from an authored hint. `Ok(None)` means "use the
    /// fallback".
    async fn generate(
        &self,
        hint: &str,
        fallback: &str,
        summary: &str,
    ) -> Result<Option<String>, GenerationError>;

    /// Pick the offered choice the player meant, if any.
    async fn resolve_choice(
        &self,
        user_text: &str,
        offered: &[OfferedChoice],
        summary: &str,
    ) -> Result<Option<String>, GenerationError>;
}

/// One completion request to a language model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions.
    pub system: String,
    /// The user turn.
    pub user: String,
    /// Reply length cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a request, returning the raw reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, GenerationError>;
}

/// [`TextGenerator`] built on a [`LanguageModel`] with story-aware prompts.
#[derive(Debug)]
pub struct PromptedGenerator<M> {
    model: M,
    system_prompt: String,
}

impl<M: LanguageModel> PromptedGenerator<M> {
    /// Wrap `model` with prompts for `graph`.
    pub fn new(model: M, graph: &StoryGraph) -> Self {
        Self {
            model,
            system_prompt: prompt::story_system_prompt(graph.title(), graph.ai_context()),
        }
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The standing instructions sent with every request.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[async_trait]
impl<M: LanguageModel> TextGenerator for PromptedGenerator<M> {
    async fn generate(
        &self,
        hint: &str,
        fallback: &str,
        summary: &str,
    ) -> Result<Option<String>, GenerationError> {
        let request = CompletionRequest {
            system: format!("{}\n\n{summary}", self.system_prompt),
            user: format!("{hint}\n\nBase text: {fallback}"),
            max_tokens: 150,
            temperature: 0.7,
        };
        let reply = self.model.complete(request).await?;
        let reply = reply.trim();
        Ok((!reply.is_empty()).then(|| reply.to_string()))
    }

    async fn resolve_choice(
        &self,
        user_text: &str,
        offered: &[OfferedChoice],
        summary: &str,
    ) -> Result<Option<String>, GenerationError> {
        if offered.is_empty() {
            return Ok(None);
        }
        let request = CompletionRequest {
            system: prompt::choice_mapping_prompt(&self.system_prompt, summary, offered),
            user: user_text.to_string(),
            max_tokens: 30,
            temperature: 0.2,
        };
        let reply = self.model.complete(request).await?;
        Ok(prompt::parse_choice_reply(&reply, offered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use murmur_core::StoryNode;

    struct Scripted {
        reply: Result<String, GenerationError>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for Scripted {
        async fn complete(&self, request: CompletionRequest) -> Result<String, GenerationError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    fn graph() -> StoryGraph {
        StoryGraph::new(
            "Delubyo",
            "Maya",
            "a",
            vec![StoryNode::new("a", "maya", "hi")],
            Vec::new(),
        )
        .unwrap()
        .with_ai_context("Batanes, typhoon season.")
    }

    fn offered() -> Vec<OfferedChoice> {
        vec![OfferedChoice {
            id: "hide".to_string(),
            text: "Hide in the church.".to_string(),
        }]
    }

    #[tokio::test]
    async fn generate_builds_request() {
        let generator = PromptedGenerator::new(Scripted::replying("  New line.  "), &graph());
        let text = generator
            .generate("Make it tense.", "The wind howls.", "ctx")
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some("New line."));

        let seen = generator.model().seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, 150);
        assert_eq!(seen[0].user, "Make it tense.\n\nBase text: The wind howls.");
        assert!(seen[0].system.contains("Batanes"));
        assert!(seen[0].system.ends_with("ctx"));
    }

    #[tokio::test]
    async fn blank_generation_means_fallback() {
        let generator = PromptedGenerator::new(Scripted::replying("   "), &graph());
        assert_eq!(generator.generate("h", "f", "s").await.unwrap(), None);
    }

    #[tokio::test]
    async fn resolve_parses_reply() {
        let generator = PromptedGenerator::new(Scripted::replying("hide"), &graph());
        let id = generator
            .resolve_choice("I'll run to the church", &offered(), "ctx")
            .await
            .unwrap();
        assert_eq!(id.as_deref(), Some("hide"));
        let seen = generator.model().seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, 30);
        assert_eq!(seen[0].user, "I'll run to the church");
        assert!(seen[0].system.contains("hide: Hide in the church."));
    }

    #[tokio::test]
    async fn resolve_without_choices_skips_the_model() {
        let generator = PromptedGenerator::new(Scripted::replying("hide"), &graph());
        assert_eq!(generator.resolve_choice("x", &[], "s").await.unwrap(), None);
        assert!(generator.model().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let model = Scripted {
            reply: Err(GenerationError::RequestFailed("timeout".to_string())),
            seen: Mutex::new(Vec::new()),
        };
        let generator = PromptedGenerator::new(model, &graph());
        assert!(matches!(
            generator.resolve_choice("x", &offered(), "s").await,
            Err(GenerationError::RequestFailed(_))
        ));
    }
}
