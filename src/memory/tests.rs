//! Tests for the semantic memory, using an in-process store and a
//! deterministic keyword embedder so nothing touches the network.

use super::*;
use crate::chat::ChatCompleter;
use crate::embedding::Embedder;
use crate::errors::Error;
use crate::store::InMemoryStore;

const DIMS: usize = 8;

/// Maps known keywords to axes of an 8-dimensional space; unknown words
/// contribute nothing. Vectors are L2-normalized.
struct TestEmbedder;

const KEYWORDS: [&str; 8] = [
    "water", "coffee", "rust", "python", "helsinki", "paris", "cat", "dog",
];

impl Embedder for TestEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        let lower = text.to_lowercase();
        let mut vec = vec![0.0f32; DIMS];
        for (axis, keyword) in KEYWORDS.iter().enumerate() {
            if lower.contains(keyword) {
                vec[axis] = 1.0;
            }
        }
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vec.iter_mut() {
                *x /= norm;
            }
        }
        Ok(vec)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Error> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn model_name(&self) -> &str {
        "test-embedder"
    }
}

struct StubChat {
    reply: &'static str,
}

impl ChatCompleter for StubChat {
    fn complete(&self, _system: Option<&str>, _user: &str) -> Result<String, Error> {
        Ok(self.reply.to_string())
    }
}

fn test_memory() -> SemanticMemory {
    SemanticMemory::new(
        Box::new(InMemoryStore::new(DIMS)),
        Box::new(TestEmbedder),
    )
}

#[test]
fn test_save_and_get() {
    let mut memory = test_memory();
    let id = memory
        .save("notes", None, "rust is a systems language", Some("{}"))
        .unwrap();

    let record = memory.get("notes", &id).unwrap().unwrap();
    assert_eq!(record.text, "rust is a systems language");
    assert_eq!(record.metadata, Some("{}".to_string()));
}

#[test]
fn test_save_creates_collection() {
    let mut memory = test_memory();
    assert!(!memory.collection_exists("notes").unwrap());
    memory.save("notes", None, "water is wet", None).unwrap();
    assert!(memory.collection_exists("notes").unwrap());
}

#[test]
fn test_save_with_id_replaces() {
    let mut memory = test_memory();
    memory
        .save("notes", Some("fact-1"), "coffee is hot", None)
        .unwrap();
    memory
        .save("notes", Some("fact-1"), "coffee is cold", None)
        .unwrap();

    let record = memory.get("notes", "fact-1").unwrap().unwrap();
    assert_eq!(record.text, "coffee is cold");
    assert_eq!(memory.list("notes", 10).unwrap().len(), 1);
}

#[test]
fn test_save_rejects_empty_input() {
    let mut memory = test_memory();
    assert!(matches!(
        memory.save("notes", None, "", None),
        Err(Error::EmptyInput)
    ));
    assert!(matches!(
        memory.save("notes", None, "   \n\t  ", None),
        Err(Error::EmptyInput)
    ));
}

#[test]
fn test_save_rejects_oversized_input() {
    let mut memory = test_memory();
    let text = "x".repeat(crate::memory::store::MAX_INPUT_LENGTH + 1);
    assert!(matches!(
        memory.save("notes", None, &text, None),
        Err(Error::InputTooLong { .. })
    ));
}

#[test]
fn test_recall_ranks_by_relevance() {
    let mut memory = test_memory();
    memory
        .save("notes", Some("r"), "rust compiles to native code", None)
        .unwrap();
    memory
        .save("notes", Some("p"), "python is interpreted", None)
        .unwrap();

    let results = memory
        .recall("notes", "tell me about rust", 10, 0.0)
        .unwrap();
    assert_eq!(results[0].id, "r");
    assert!(results[0].relevance.unwrap() > results[1].relevance.unwrap());
}

#[test]
fn test_recall_applies_min_relevance() {
    let mut memory = test_memory();
    memory
        .save("notes", Some("r"), "rust compiles to native code", None)
        .unwrap();
    memory
        .save("notes", Some("c"), "my cat sleeps all day", None)
        .unwrap();

    let results = memory
        .recall("notes", "tell me about rust", 10, 0.5)
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "r");
}

#[test]
fn test_recall_rejects_invalid_min_relevance() {
    let mut memory = test_memory();
    memory.save("notes", None, "water is wet", None).unwrap();

    assert!(memory.recall("notes", "water", 10, -0.5).is_err());
    assert!(memory.recall("notes", "water", 10, 1.5).is_err());
    assert!(memory.recall("notes", "water", 10, f64::NAN).is_err());
}

#[test]
fn test_recall_rejects_invalid_limit() {
    let mut memory = test_memory();
    memory.save("notes", None, "water is wet", None).unwrap();

    assert!(memory.recall("notes", "water", 0, 0.0).is_err());
    assert!(memory.recall("notes", "water", 100_000, 0.0).is_err());
}

#[test]
fn test_forget() {
    let mut memory = test_memory();
    let id = memory.save("notes", None, "dog facts", None).unwrap();

    assert!(memory.forget("notes", &id).unwrap());
    assert!(!memory.forget("notes", &id).unwrap());
    assert!(memory.get("notes", &id).unwrap().is_none());
}

#[test]
fn test_collection_lifecycle() {
    let mut memory = test_memory();
    memory.ensure_collection("scratch").unwrap();
    assert!(memory.collection_exists("scratch").unwrap());

    memory.drop_collection("scratch").unwrap();
    assert!(!memory.collection_exists("scratch").unwrap());

    // Dropping a collection that is already gone is fine.
    memory.drop_collection("scratch").unwrap();
}

#[test]
fn test_ask_grounds_reply_in_recalled_memories() {
    let mut memory = test_memory();
    memory
        .save("notes", Some("h"), "helsinki is the capital of finland", None)
        .unwrap();
    memory
        .save("notes", Some("c"), "my cat sleeps all day", None)
        .unwrap();

    let chat = StubChat { reply: "Helsinki." };
    let answer = memory
        .ask("notes", "what is the capital near helsinki?", 5, 0.3, &chat)
        .unwrap();

    assert_eq!(answer.reply, "Helsinki.");
    assert_eq!(answer.context.len(), 1);
    assert_eq!(answer.context[0].id, "h");
}

#[test]
fn test_ask_with_no_matches_still_answers() {
    let mut memory = test_memory();
    memory.save("notes", None, "dog facts", None).unwrap();

    let chat = StubChat {
        reply: "I don't know.",
    };
    let answer = memory
        .ask("notes", "what is the boiling point of xenon?", 5, 0.5, &chat)
        .unwrap();

    assert_eq!(answer.reply, "I don't know.");
    assert!(answer.context.is_empty());
}
