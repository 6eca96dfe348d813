use crate::calculator;
use crate::llm::{ChatBackend, ProviderError};
use crate::retriever::Retriever;
use tracing::debug;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful agent. Be concise. Use provided context when relevant.";

const CALC_PREFIX: &str = "calc:";
const SEARCH_PREFIX: &str = "search:";

/// Where one line of input is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Calc(&'a str),
    Search(&'a str),
    Chat(&'a str),
}

impl<'a> Route<'a> {
    pub fn parse(input: &'a str) -> Self {
        if let Some(expression) = strip_prefix_ignore_case(input, CALC_PREFIX) {
            Self::Calc(expression.trim())
        } else if let Some(query) = strip_prefix_ignore_case(input, SEARCH_PREFIX) {
            Self::Search(query.trim())
        } else {
            Self::Chat(input)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Calc(_) => "calc",
            Self::Search(_) => "search",
            Self::Chat(_) => "chat",
        }
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &input[prefix.len()..])
}

/// Routes input to the calculator, the retriever, or the chat backend.
///
/// Calculator failures are rendered into the reply. Chat backend failures
/// are returned to the caller.
pub struct Agent {
    backend: ChatBackend,
    retriever: Retriever,
    top_k: usize,
}

impl Agent {
    pub fn new(backend: ChatBackend, retriever: Retriever, top_k: usize) -> Self {
        Self {
            backend,
            retriever,
            top_k,
        }
    }

    pub fn backend(&self) -> &ChatBackend {
        &self.backend
    }

    pub async fn reply(&self, input: &str) -> Result<String, ProviderError> {
        match Route::parse(input) {
            Route::Calc(expression) => Ok(match calculator::evaluate(expression) {
                Ok(value) => format!("calc={value}"),
                Err(e) => format!("calc error: {e}"),
            }),
            Route::Search(query) => Ok(self.search(query)),
            Route::Chat(question) => self.chat(question).await,
        }
    }

    fn search(&self, query: &str) -> String {
        let results = self.retriever.query(query, self.top_k);
        if results.is_empty() {
            return "search results: (none)".to_string();
        }

        let mut reply = String::from("search results:");
        for body in results {
            reply.push_str("\n- ");
            reply.push_str(&body);
        }
        reply
    }

    async fn chat(&self, question: &str) -> Result<String, ProviderError> {
        let user = self.build_prompt(question);
        debug!(
            backend = self.backend.name(),
            with_context = user != question,
            "Calling chat backend"
        );
        self.backend.chat(SYSTEM_PROMPT, &user).await
    }

    /// Prepends retrieved context to the question. Input passes through
    /// unchanged when nothing non-blank was retrieved.
    pub fn build_prompt(&self, question: &str) -> String {
        let context = self.retriever.query(question, self.top_k).join("\n");
        if context.trim().is_empty() {
            question.to_string()
        } else {
            format!("Context:\n{context}\n\nQuestion: {question}")
        }
    }
}
