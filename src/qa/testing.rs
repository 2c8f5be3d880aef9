//! Mock QA chain for tests

use super::{QaChain, QaError};
use crate::chat::ConversationTurn;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded `answer` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub history: Vec<ConversationTurn>,
}

/// Mock chain that returns queued results in order
pub struct MockQaChain {
    results: Mutex<VecDeque<Result<String, QaError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockQaChain {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful Markdown answer
    pub fn queue_answer(&self, markdown: impl Into<String>) {
        self.results.lock().unwrap().push_back(Ok(markdown.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: QaError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QaChain for MockQaChain {
    async fn answer(&self, prompt: &str, history: &[ConversationTurn]) -> Result<String, QaError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            history: history.to_vec(),
        });
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(QaError::network("No mock answer queued")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
