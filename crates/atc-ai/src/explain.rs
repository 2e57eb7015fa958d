use crate::llm_provider::{GenerationConfig, LLMProvider, LLMResult, Message};
use atc_core::NO_EXPLANATION_FALLBACK;
use tracing::debug;

/// Instruction sent ahead of every phrase.
pub const SYSTEM_PROMPT: &str = "You are an expert aviation instructor. Explain any Air Traffic Control (ATC) or pilot phrase in simple, clear, and beginner-friendly English. Be concise and focus on the meaning relevant to flight operations.";

/// The fixed two-message conversation for `phrase`. The phrase is passed through verbatim.
pub fn explanation_messages(phrase: &str) -> Vec<Message> {
    vec![Message::system(SYSTEM_PROMPT), Message::user(phrase)]
}

/// Ask `provider` to explain `phrase`, exactly once.
///
/// A reply with no text (no choices, null or empty content) is not an error:
/// it yields [`NO_EXPLANATION_FALLBACK`].
pub async fn explain_phrase(
    provider: &dyn LLMProvider,
    phrase: &str,
    config: &GenerationConfig,
) -> LLMResult<String> {
    let response = provider
        .generate_chat(&explanation_messages(phrase), config)
        .await?;

    debug!(
        provider = provider.provider_name(),
        model = %response.model,
        finish_reason = ?response.finish_reason,
        total_tokens = ?response.total_tokens,
        "Explanation received"
    );

    Ok(response
        .content
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| NO_EXPLANATION_FALLBACK.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_provider::{LLMResponse, MessageRole};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        content: Option<String>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl Canned {
        fn new(content: Option<&str>) -> Self {
            Self {
                content: content.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for Canned {
        async fn generate_chat(
            &self,
            messages: &[Message],
            _config: &GenerationConfig,
        ) -> LLMResult<LLMResponse> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(LLMResponse {
                content: self.content.clone(),
                model: "canned".into(),
                ..Default::default()
            })
        }

        fn provider_name(&self) -> &str {
            "canned"
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn conversation_is_system_then_verbatim_user() {
        let messages = explanation_messages("  Squawk 7700 ");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(messages[1].content, "  Squawk 7700 ");
    }

    #[tokio::test]
    async fn returns_provider_text() {
        let provider = Canned::new(Some("Set transponder to emergency."));
        let text = explain_phrase(&provider, "Squawk 7700", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "Set transponder to emergency.");
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_or_empty_text_falls_back() {
        for content in [None, Some("")] {
            let provider = Canned::new(content);
            let text = explain_phrase(&provider, "Roger", &GenerationConfig::default())
                .await
                .unwrap();
            assert_eq!(text, NO_EXPLANATION_FALLBACK);
        }
    }
}
