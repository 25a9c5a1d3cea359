//! Chat session: a bot definition plus conversation state.

use super::bot::BotDefinition;
use super::message::{Message, MessageRole};
use crate::error::Result;
use crate::generation::{GenerationRequest, GenerationResult, Generator};
use chrono::{DateTime, Utc};
use std::fmt;

pub const DEFAULT_TITLE: &str = "New Chat";
pub const DEFAULT_PARTICIPANT: &str = "User";
pub const DEFAULT_REPLIES_LIMIT: u32 = 10;

/// A conversation between one participant and one bot.
///
/// A reply is a user message followed by the assistant's answer, so
/// [`ChatSession::replies`] is half the history length. When the reply ceiling
/// is reached the oldest exchange is evicted before a new one is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub bot: BotDefinition,
    pub title: String,
    /// Maximum number of retained replies; `None` means unbounded.
    pub replies_limit: Option<u32>,
    pub participant: String,
    pub created_at: DateTime<Utc>,
    pub history: Vec<Message>,
}

/// One prompt from the participant, with optional attachments.
#[derive(Debug, Clone, Default)]
pub struct ChatTurn {
    pub prompt: String,
    /// Overrides the session's participant for this turn.
    pub participant: Option<String>,
    pub images: Vec<String>,
    pub files: Vec<String>,
}

impl ChatTurn {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

impl ChatSession {
    /// Starts an empty session created now.
    pub fn new(bot: BotDefinition) -> Self {
        Self {
            bot,
            title: DEFAULT_TITLE.to_string(),
            replies_limit: Some(DEFAULT_REPLIES_LIMIT),
            participant: DEFAULT_PARTICIPANT.to_string(),
            created_at: Utc::now(),
            history: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_replies_limit(mut self, limit: Option<u32>) -> Self {
        self.replies_limit = limit;
        self
    }

    pub fn with_participant(mut self, participant: impl Into<String>) -> Self {
        self.participant = participant.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn replies(&self) -> usize {
        self.history.len() / 2
    }

    /// Total tokens spent across the retained history.
    pub fn cost(&self) -> u64 {
        self.history.iter().map(|m| u64::from(m.tokens)).sum()
    }

    fn limit_reached(&self) -> bool {
        match self.replies_limit {
            Some(limit) => self.replies() >= limit as usize,
            None => false,
        }
    }

    /// Appends a prompt and its reply, evicting the oldest exchange first when
    /// the ceiling is reached.
    pub fn record_exchange(
        &mut self,
        prompt: &str,
        owner: Option<&str>,
        result: &GenerationResult,
    ) {
        let owner = owner.unwrap_or(&self.participant).to_string();

        if self.limit_reached() && !self.history.is_empty() {
            let evicted = self.history.len().min(2);
            self.history.drain(..evicted);
        }

        self.history.push(
            Message::new(
                MessageRole::User,
                prompt,
                owner,
                result.prompt_tokens,
                result.start_timestamp.clone(),
            )
            .with_attachments(result.input.images.clone(), result.input.files.clone()),
        );
        self.history.push(
            Message::new(
                MessageRole::Assistant,
                result.content.clone(),
                self.bot.name.clone(),
                result.completion_tokens,
                result.final_timestamp.clone(),
            )
            .with_attachments(result.output.images.clone(), result.output.files.clone()),
        );
    }

    /// Asks the generator for a reply to `turn` and records the exchange.
    pub async fn respond(&mut self, generator: &dyn Generator, turn: ChatTurn) -> Result<String> {
        let participant = turn
            .participant
            .clone()
            .unwrap_or_else(|| self.participant.clone());

        let result = generator
            .generate(
                &self.bot,
                GenerationRequest {
                    prompt: &turn.prompt,
                    participant: &participant,
                    history: &self.history,
                    images: turn.images,
                    files: turn.files,
                    schema: self.bot.schema.as_ref(),
                },
            )
            .await?;

        tracing::debug!(
            title = %self.title,
            prompt_tokens = result.prompt_tokens,
            completion_tokens = result.completion_tokens,
            "Recorded chat exchange"
        );
        self.record_exchange(&turn.prompt, turn.participant.as_deref(), &result);
        Ok(result.content)
    }
}

impl fmt::Display for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = self
            .replies_limit
            .map(|l| l.to_string())
            .unwrap_or_else(|| "inf".to_string());
        write!(
            f,
            "<Chat | title={:?}, replies_limit={}, replies={}, creation_date={:?}>",
            self.title,
            limit,
            self.replies(),
            self.created_at.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::AttachmentMetadata;
    use crate::record::ConfigRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    fn bot() -> BotDefinition {
        BotDefinition::new(ConfigRecord::new("sk-test-0000000000000000", "gpt-4o")).with_name("Iris")
    }

    fn result(content: &str) -> GenerationResult {
        GenerationResult {
            content: content.to_string(),
            prompt_tokens: 5,
            completion_tokens: 7,
            total_tokens: 12,
            start_timestamp: "2024-01-01T00:00:00Z".to_string(),
            elapsed: Duration::from_millis(40),
            final_timestamp: "2024-01-01T00:00:01Z".to_string(),
            input: AttachmentMetadata {
                images: vec!["https://example.com/cat.png".to_string()],
                files: vec![],
            },
            output: AttachmentMetadata::default(),
        }
    }

    // Mock Generator for testing
    struct MockGenerator {
        seen_history_len: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Generator for MockGenerator {
        async fn generate(
            &self,
            bot: &BotDefinition,
            request: GenerationRequest<'_>,
        ) -> Result<GenerationResult> {
            self.seen_history_len.lock().unwrap().push(request.history.len());
            Ok(result(&format!("{} says hi to {}", bot.name, request.participant)))
        }
    }

    #[test]
    fn test_record_exchange_appends_user_and_assistant() {
        let mut chat = ChatSession::new(bot());
        chat.record_exchange("hello", None, &result("hi"));

        assert_eq!(chat.history.len(), 2);
        assert_eq!(chat.replies(), 1);
        assert_eq!(chat.history[0].role, MessageRole::User);
        assert_eq!(chat.history[0].owner, DEFAULT_PARTICIPANT);
        assert_eq!(chat.history[0].images.len(), 1);
        assert_eq!(chat.history[1].role, MessageRole::Assistant);
        assert_eq!(chat.history[1].owner, "Iris");
        assert_eq!(chat.cost(), 12);
    }

    #[test]
    fn test_limit_evicts_oldest_exchange() {
        let mut chat = ChatSession::new(bot()).with_replies_limit(Some(2));
        chat.record_exchange("one", None, &result("1"));
        chat.record_exchange("two", None, &result("2"));
        chat.record_exchange("three", Some("Ada"), &result("3"));

        assert_eq!(chat.replies(), 2);
        assert_eq!(chat.history[0].content, "two");
        assert_eq!(chat.history[2].content, "three");
        assert_eq!(chat.history[2].owner, "Ada");
    }

    #[test]
    fn test_unbounded_session_keeps_everything() {
        let mut chat = ChatSession::new(bot()).with_replies_limit(None);
        for i in 0..25 {
            chat.record_exchange(&i.to_string(), None, &result("ok"));
        }
        assert_eq!(chat.replies(), 25);
    }

    #[tokio::test]
    async fn test_respond_passes_history_and_records() {
        let generator = MockGenerator {
            seen_history_len: Mutex::new(Vec::new()),
        };
        let mut chat = ChatSession::new(bot()).with_participant("Ada");

        let first = chat.respond(&generator, ChatTurn::new("hello")).await.unwrap();
        let second = chat.respond(&generator, ChatTurn::new("again")).await.unwrap();

        assert_eq!(first, "Iris says hi to Ada");
        assert_eq!(second, first);
        assert_eq!(*generator.seen_history_len.lock().unwrap(), vec![0, 2]);
        assert_eq!(chat.replies(), 2);
    }

    #[test]
    fn test_display_shows_infinite_limit() {
        let chat = ChatSession::new(bot()).with_replies_limit(None);
        assert!(chat.to_string().contains("replies_limit=inf"));
    }
}
