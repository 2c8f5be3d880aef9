//! Page templates
//!
//! Templates are compiled into the binary. Auto-escaping is on for `.html`
//! templates, so only assistant content (already sanitized) is marked safe.

use crate::chat::ConversationTurn;
use minijinja::{context, Environment};

const INDEX_TEMPLATE: &str = "index.html";
const PAGE_TITLE: &str = "RAG Chat";

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../../templates/index.html"))?;
        Ok(Self { env })
    }

    /// Render the chat page for a log, optionally with an error banner
    pub fn chat_page(
        &self,
        messages: &[ConversationTurn],
        error: Option<&str>,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template(INDEX_TEMPLATE)?.render(context! {
            title => PAGE_TITLE,
            messages => messages,
            error => error,
        })
    }
}
