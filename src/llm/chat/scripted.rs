use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{ ChatClient, ChatContent, ChatError, CompletionResponse };

/// Test double that replays canned replies and records every request.
pub struct ScriptedChatClient {
    replies: Mutex<VecDeque<Result<String, ChatError>>>,
    requests: Mutex<Vec<(Vec<ChatContent>, String)>>,
}

impl ScriptedChatClient {
    pub fn new(replies: Vec<Result<String, ChatError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(t.to_string()))
                .collect()
        )
    }

    pub fn requests(&self) -> Vec<(Vec<ChatContent>, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn send_message(
        &self,
        history: &[ChatContent],
        message: &str
    ) -> Result<CompletionResponse, ChatError> {
        self.requests.lock().unwrap().push((history.to_vec(), message.to_string()));
        let next = self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Config("no scripted reply left".to_string())));
        next.map(|response| CompletionResponse { response })
    }

    fn get_model(&self) -> String {
        "scripted".to_string()
    }
}
