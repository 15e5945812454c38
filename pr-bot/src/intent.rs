//! Classifies a comment as an edit request or a plain question.

use ai_llm_service::json_coerce::parse_lenient;
use ai_llm_service::{LlmClient, ModelProfile};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const SYSTEM_PROMPT: &str = "You are a PR intent classifier. Respond only with valid JSON.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentCategory {
    ClearAction,
    PossibleAction,
    QuestionOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub category: IntentCategory,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl Intent {
    pub fn question_only() -> Self {
        Self {
            category: IntentCategory::QuestionOnly,
            action: None,
            confidence: 0.0,
            reasoning: None,
        }
    }

    /// The requested action, falling back to the comment itself.
    pub fn action_or<'a>(&'a self, comment: &'a str) -> &'a str {
        self.action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| comment.trim())
    }
}

fn classify_prompt(comment: &str) -> String {
    format!(
        "Classify this PR comment into one of three categories:\n\n\
         Comment: \"{comment}\"\n\n\
         Categories:\n\
         1. CLEAR_ACTION - User clearly wants code changes (e.g., \"add comments to file.ts\", \"fix the bug in auth.ts\")\n\
         2. POSSIBLE_ACTION - Might want changes but ambiguous (e.g., \"this needs comments\", \"could use error handling\")\n\
         3. QUESTION_ONLY - Just asking a question, no action requested\n\n\
         Also extract what action they want if it's an action request.\n\n\
         Respond ONLY with JSON:\n\
         {{\n  \"category\": \"CLEAR_ACTION|POSSIBLE_ACTION|QUESTION_ONLY\",\n  \"action\": \"description of what to do (if applicable)\",\n  \"confidence\": 0.0-1.0,\n  \"reasoning\": \"brief explanation\"\n}}"
    )
}

/// Any failure (transport, unparsable JSON, unknown category) yields
/// [`IntentCategory::QuestionOnly`].
pub async fn classify_intent(llm: &LlmClient, comment: &str) -> Intent {
    let req = llm
        .request(ModelProfile::Slow, SYSTEM_PROMPT, &classify_prompt(comment))
        .temperature(0.1)
        .max_tokens(200)
        .timeout_secs(30);

    let intent = match llm.call_chat_json(&req).await {
        Ok(text) => parse_lenient::<Intent>(&text).unwrap_or_else(|| {
            warn!("intent reply was not usable JSON");
            Intent::question_only()
        }),
        Err(e) => {
            warn!(error = %e, "intent classification failed");
            Intent::question_only()
        }
    };
    info!(
        category = ?intent.category,
        confidence = intent.confidence,
        action = intent.action.as_deref().unwrap_or("N/A"),
        "intent classified"
    );
    intent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_json_parses_with_missing_fields() {
        let i: Intent = serde_json::from_str(r#"{"category": "POSSIBLE_ACTION", "action": "add docs"}"#).unwrap();
        assert_eq!(i.category, IntentCategory::PossibleAction);
        assert_eq!(i.action_or("ignored"), "add docs");
        assert_eq!(i.confidence, 0.0);
        assert!(serde_json::from_str::<Intent>(r#"{"category": "MAYBE"}"#).is_err());
    }

    #[test]
    fn blank_action_falls_back_to_comment() {
        let i = Intent {
            category: IntentCategory::ClearAction,
            action: Some("  ".into()),
            confidence: 0.9,
            reasoning: None,
        };
        assert_eq!(i.action_or(" fix auth.ts "), "fix auth.ts");
    }
}
