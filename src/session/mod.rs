//! Conversation session manager.
//!
//! A [`ChatSession`] owns the [`ConversationLog`] of one client connection.
//! Every submission replays the whole log to the chat client and, only when a
//! non-empty reply comes back, records the question and the answer as a pair.

use std::fmt;
use std::sync::Arc;
use log::{ info, warn };
use thiserror::Error;
use uuid::Uuid;

use crate::llm::chat::{ ChatClient, ChatContent, ChatError };
use crate::models::chat::{ ConversationLog, Role, Turn };
use crate::models::websocket::TranscriptLine;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Send failed: {0}")] Chat(#[from] ChatError),
    #[error("Send failed: the model returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was sent and nothing recorded.
    Ignored,
    Answered(String),
}

/// One rendered row of the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLine<'a> {
    pub role: Role,
    pub content: &'a str,
}

impl DisplayLine<'_> {
    pub fn label(&self) -> &'static str {
        self.role.label()
    }

    pub fn to_transcript_line(&self) -> TranscriptLine {
        TranscriptLine {
            role: self.role.as_str().to_string(),
            label: self.label().to_string(),
            content: self.content.to_string(),
        }
    }
}

impl fmt::Display for DisplayLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.content)
    }
}

pub struct ChatSession {
    id: String,
    log: ConversationLog,
    client: Arc<dyn ChatClient>,
}

impl ChatSession {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            log: ConversationLog::new(),
            client,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// The history sent for `user_text`: every recorded turn in order,
    /// followed by the pending question.
    pub fn history_request(&self, user_text: &str) -> Vec<ChatContent> {
        let mut messages: Vec<ChatContent> = self.log
            .iter()
            .map(|turn| ChatContent::text(turn.role, turn.content.clone()))
            .collect();
        messages.push(ChatContent::text(Role::User, user_text));
        messages
    }

    /// Whitespace-only input counts as empty: it is never sent to the model
    /// and returns [`SubmitOutcome::Ignored`].
    pub async fn submit(&mut self, user_text: &str) -> Result<SubmitOutcome, SessionError> {
        if user_text.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }

        let messages = self.history_request(user_text);
        let response = match self.client.send_message(&messages, user_text).await {
            Ok(resp) => resp.response,
            Err(e) => {
                warn!("Session {}: chat call failed, nothing recorded: {}", self.id, e);
                return Err(SessionError::Chat(e));
            }
        };

        if response.is_empty() {
            warn!("Session {}: empty response, nothing recorded", self.id);
            return Err(SessionError::EmptyResponse);
        }

        self.log.push(Turn::new(Role::User, user_text));
        self.log.push(Turn::new(Role::Assistant, response.clone()));
        info!("Session {}: recorded exchange, log now holds {} turns", self.id, self.log.len());

        Ok(SubmitOutcome::Answered(response))
    }

    pub fn render(&self) -> impl Iterator<Item = DisplayLine<'_>> + '_ {
        self.log.iter().map(|turn| DisplayLine {
            role: turn.role,
            content: &turn.content,
        })
    }

    pub fn transcript(&self) -> Vec<TranscriptLine> {
        self.render()
            .map(|line| line.to_transcript_line())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::scripted::ScriptedChatClient;

    fn session_with(client: ScriptedChatClient) -> (ChatSession, Arc<ScriptedChatClient>) {
        let client = Arc::new(client);
        (ChatSession::new(Arc::clone(&client) as Arc<dyn ChatClient>), client)
    }

    #[tokio::test]
    async fn seat_rating_question_records_pair() {
        let (mut session, _client) = session_with(ScriptedChatClient::answering(&["3.8"]));

        let outcome = session.submit("What is the average seat rating?").await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Answered("3.8".to_string()));

        let turns = session.log().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "What is the average seat rating?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "3.8");

        let rendered: Vec<String> = session
            .render()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(rendered, vec!["You: What is the average seat rating?", "AI: 3.8"]);
    }

    #[tokio::test]
    async fn n_submissions_give_2n_alternating_turns() {
        let (mut session, _client) = session_with(
            ScriptedChatClient::answering(&["a1", "a2", "a3", "a4"])
        );
        for i in 0..4 {
            session.submit(&format!("q{}", i)).await.unwrap();
            assert_eq!(session.log().len(), 2 * (i + 1));
        }
        for (i, turn) in session.log().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role, expected);
        }
    }

    #[tokio::test]
    async fn empty_input_is_a_noop() {
        let (mut session, client) = session_with(ScriptedChatClient::answering(&["unused"]));

        assert_eq!(session.submit("").await.unwrap(), SubmitOutcome::Ignored);
        assert_eq!(session.submit("   \n").await.unwrap(), SubmitOutcome::Ignored);
        assert!(session.log().is_empty());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_or_empty_reply_leaves_log_untouched() {
        let (mut session, client) = session_with(
            ScriptedChatClient::new(
                vec![
                    Ok("first answer".to_string()),
                    Err(ChatError::Api { status: 503, message: "overloaded".to_string() }),
                    Ok(String::new())
                ]
            )
        );

        session.submit("first").await.unwrap();
        assert_eq!(session.log().len(), 2);

        let err = session.submit("second").await.unwrap_err();
        assert!(matches!(err, SessionError::Chat(ChatError::Api { status: 503, .. })));
        assert_eq!(session.log().len(), 2);

        let err = session.submit("third").await.unwrap_err();
        assert!(matches!(err, SessionError::EmptyResponse));
        assert_eq!(session.log().len(), 2);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn full_history_is_replayed_with_pending_question() {
        let (mut session, client) = session_with(ScriptedChatClient::answering(&["one", "two"]));
        session.submit("first").await.unwrap();
        session.submit("second").await.unwrap();

        let requests = client.requests();
        let (history, message) = &requests[1];
        assert_eq!(message, "second");
        let flattened: Vec<(Role, &str)> = history
            .iter()
            .map(|c| (c.role, c.parts[0].text.as_str()))
            .collect();
        assert_eq!(
            flattened,
            vec![(Role::User, "first"), (Role::Assistant, "one"), (Role::User, "second")]
        );
    }

    #[tokio::test]
    async fn render_is_repeatable() {
        let (mut session, _client) = session_with(ScriptedChatClient::answering(&["x", "y"]));
        session.submit("a").await.unwrap();
        session.submit("b").await.unwrap();

        let first: Vec<String> = session
            .render()
            .map(|l| l.to_string())
            .collect();
        let second: Vec<String> = session
            .render()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["You: a", "AI: x", "You: b", "AI: y"]);
    }
}
