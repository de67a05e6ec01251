//! Answer generation from retrieved context and conversation history.

use super::{format_context_for_prompt, ContextChunk};
use crate::config::Prompts;
use crate::error::{Result, VidQaError};
use crate::llm::{LanguageModel, Prompt};
use crate::session::{ConversationHistory, ConversationTurn};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Builds prompts and records answered turns.
pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
    response_language: String,
    max_history_turns: usize,
}

impl AnswerGenerator {
    /// Create a generator with default prompts.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
            response_language: "English".to_string(),
            max_history_turns: 10,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set the language answers are written in.
    pub fn with_response_language(mut self, language: impl Into<String>) -> Self {
        self.response_language = language.into();
        self
    }

    /// Set how many recent turns are rendered into the prompt.
    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = turns;
        self
    }

    /// Assemble the prompt: instructions, context in retrieval order, prior turns, question.
    pub fn build_prompt(
        &self,
        question: &str,
        context: &[ContextChunk],
        history: &ConversationHistory,
    ) -> Prompt {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context_for_prompt(context));
        vars.insert("history".to_string(), self.format_history(history));
        vars.insert("response_language".to_string(), self.response_language.clone());

        Prompt {
            system: self.prompts.render_with_custom(&self.prompts.rag.system, &vars),
            user: self.prompts.render_with_custom(&self.prompts.rag.user, &vars),
        }
    }

    fn format_history(&self, history: &ConversationHistory) -> String {
        let recent = history.recent(self.max_history_turns);
        if recent.is_empty() {
            return self.prompts.rag.empty_history.clone();
        }

        recent
            .iter()
            .map(|turn| format!("User: {}\nAssistant: {}", turn.question, turn.answer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Generate an answer and append the turn to `history`.
    ///
    /// The model's text is returned verbatim. On failure nothing is appended.
    #[instrument(skip(self, context, history), fields(chunks = context.len(), turns = history.len()))]
    pub async fn answer(
        &self,
        question: &str,
        context: Vec<ContextChunk>,
        history: &mut ConversationHistory,
    ) -> Result<ConversationTurn> {
        info!("Generating answer with {}", self.model.model_id());

        let prompt = self.build_prompt(question, &context, history);
        let answer = self.model.generate(&prompt).await?;
        if answer.trim().is_empty() {
            return Err(VidQaError::GenerationFailure("Model returned an empty answer".to_string()));
        }

        debug!("Generated answer with {} sources", context.len());

        let turn = ConversationTurn::new(question.to_string(), answer, context);
        history.push(turn.clone());
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BlankModel, EchoModel, FailingModel};

    fn chunk(order: usize, content: &str) -> ContextChunk {
        ContextChunk {
            order,
            timestamp: "00:00".to_string(),
            start_seconds: 0.0,
            content: content.to_string(),
            score: 1.0,
            url: String::new(),
        }
    }

    #[test]
    fn test_prompt_contains_all_parts_in_order() {
        let generator = AnswerGenerator::new(Arc::new(EchoModel)).with_response_language("Hindi");
        let mut history = ConversationHistory::new();
        history.push(ConversationTurn::new("first q".to_string(), "first a".to_string(), vec![]));
        history.push(ConversationTurn::new("second q".to_string(), "second a".to_string(), vec![]));

        let prompt = generator.build_prompt("new question", &[chunk(1, "beta"), chunk(0, "alpha")], &history);

        assert!(prompt.system.contains("ONLY"));
        assert!(prompt.system.contains("Hindi"));
        let user = &prompt.user;
        let beta = user.find("beta").unwrap();
        let alpha = user.find("alpha").unwrap();
        let first = user.find("User: first q").unwrap();
        let second = user.find("User: second q").unwrap();
        let question = user.find("Question: new question").unwrap();
        assert!(beta < alpha);
        assert!(alpha < first);
        assert!(first < second);
        assert!(second < question);
    }

    #[test]
    fn test_prompt_history_is_bounded_and_marked_when_empty() {
        let generator = AnswerGenerator::new(Arc::new(EchoModel)).with_max_history_turns(1);
        let mut history = ConversationHistory::new();

        let prompt = generator.build_prompt("q", &[], &history);
        assert!(prompt.user.contains("(no previous conversation)"));

        history.push(ConversationTurn::new("old".to_string(), "x".to_string(), vec![]));
        history.push(ConversationTurn::new("recent".to_string(), "y".to_string(), vec![]));
        let prompt = generator.build_prompt("q", &[], &history);
        assert!(prompt.user.contains("User: recent"));
        assert!(!prompt.user.contains("User: old"));
    }

    #[test]
    fn test_template_syntax_in_inputs_is_kept_verbatim() {
        let generator = AnswerGenerator::new(Arc::new(EchoModel));
        let mut history = ConversationHistory::new();
        history.push(ConversationTurn::new(
            "how do filters work?".to_string(),
            "use {{question}} here".to_string(),
            vec![],
        ));
        let question = "What does {{context}} mean in {{response_language}}?";

        for _ in 0..50 {
            let prompt = generator.build_prompt(question, &[chunk(0, "say {{history}}")], &history);
            assert!(prompt.user.contains("Question: What does {{context}} mean in {{response_language}}?"));
            assert!(prompt.user.contains("[00:00] say {{history}}"));
            assert!(prompt.user.contains("Assistant: use {{question}} here"));
        }
    }

    #[tokio::test]
    async fn test_answer_appends_turn() {
        let generator = AnswerGenerator::new(Arc::new(EchoModel));
        let mut history = ConversationHistory::new();

        let turn = generator
            .answer("What is it about?", vec![chunk(0, "cats")], &mut history)
            .await
            .unwrap();

        assert!(!turn.answer.is_empty());
        assert_eq!(turn.sources.len(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.turns()[0], turn);
    }

    #[tokio::test]
    async fn test_failed_generation_appends_nothing() {
        let generator = AnswerGenerator::new(Arc::new(FailingModel));
        let mut history = ConversationHistory::new();

        let err = generator
            .answer("q", vec![chunk(0, "cats")], &mut history)
            .await
            .unwrap_err();

        assert!(matches!(err, VidQaError::GenerationFailure(_)));
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_blank_answer_is_generation_failure() {
        let generator = AnswerGenerator::new(Arc::new(BlankModel));
        let mut history = ConversationHistory::new();

        let err = generator.answer("q", vec![], &mut history).await.unwrap_err();

        assert!(matches!(err, VidQaError::GenerationFailure(_)));
        assert!(history.is_empty());
    }
}
