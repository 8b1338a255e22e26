//! Grounded question answering over recalled memories.

use std::collections::HashMap;

use crate::chat::ChatCompleter;
use crate::errors::Error;
use crate::store::Record;
use crate::template::{render, GROUNDED_ANSWER_TEMPLATE};

use super::store::SemanticMemory;

/// Reply to an `ask`, with the memories it was grounded on.
pub struct Answer {
    pub reply: String,
    pub context: Vec<Record>,
}

/// Fallback context when nothing relevant was recalled.
const NO_CONTEXT: &str = "(no stored memories matched the question)";

fn format_context(records: &[Record]) -> String {
    if records.is_empty() {
        return NO_CONTEXT.to_string();
    }
    records
        .iter()
        .map(|r| format!("- {}", r.text))
        .collect::<Vec<_>>()
        .join("\n")
}

impl SemanticMemory {
    #[must_use = "handle the error or results may be lost"]
    /// Answer a question grounded in recalled memories.
    ///
    /// Recalls the most relevant memories, renders them into the grounding
    /// prompt, and asks the chat model for a single completion. When nothing
    /// passes the relevance floor the model is told so rather than being
    /// given an empty context.
    ///
    /// # Errors
    ///
    /// Returns error if recall fails or the chat request fails.
    pub fn ask(
        &self,
        collection: &str,
        question: &str,
        limit: usize,
        min_relevance: f64,
        chat: &dyn ChatCompleter,
    ) -> Result<Answer, Error> {
        let context = self.recall(collection, question, limit, min_relevance)?;

        let mut vars = HashMap::new();
        vars.insert("context", format_context(&context));
        vars.insert("question", question.trim().to_string());
        let prompt = render(GROUNDED_ANSWER_TEMPLATE, &vars)?;

        let reply = chat.complete(None, &prompt)?;
        Ok(Answer { reply, context })
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn record(text: &str) -> Record {
        Record {
            id: "id".to_string(),
            collection: "notes".to_string(),
            text: text.to_string(),
            metadata: None,
            relevance: Some(0.9),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_format_context_bullets() {
        let records = vec![record("first fact"), record("second fact")];
        assert_eq!(format_context(&records), "- first fact\n- second fact");
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), NO_CONTEXT);
    }
}
