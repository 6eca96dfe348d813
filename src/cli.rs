use crate::config::{Config, ProviderKind};
use clap::Parser;
use std::path::PathBuf;

/// Console agent with a calculator, a document search tool and a pluggable
/// chat backend.
///
/// Try `calc: 2 + 2` or `search: rag`; anything else goes to the chat
/// backend with retrieved context. Type `exit` to quit.
#[derive(Debug, Parser)]
#[command(name = "agent-playground", version)]
pub struct Cli {
    /// Chat backend: openai, anthropic or echo (overrides LLM_PROVIDER)
    #[arg(long)]
    pub provider: Option<String>,

    /// Directory of .txt/.md files to index (overrides DOCS_DIR)
    #[arg(long, value_name = "DIR")]
    pub docs: Option<PathBuf>,

    /// Documents retrieved per turn (overrides TOP_K)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Maximum characters per indexed chunk (overrides CHUNK_CHARS)
    #[arg(long)]
    pub chunk_chars: Option<usize>,

    /// Answer a single prompt and exit instead of starting the console
    pub prompt: Option<String>,
}

impl Cli {
    /// Flags take precedence over values read from the environment.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(provider) = &self.provider {
            config.provider = ProviderKind::from_name(provider);
        }
        if let Some(docs) = &self.docs {
            config.docs_dir = Some(docs.clone());
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(chunk_chars) = self.chunk_chars {
            config.chunk_chars = chunk_chars;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "agent-playground",
            "--provider",
            "openai",
            "--docs",
            "./notes",
            "--top-k",
            "3",
            "what is rag?",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.docs_dir, Some(PathBuf::from("./notes")));
        assert_eq!(config.top_k, 3);
        assert_eq!(config.chunk_chars, 800);
        assert_eq!(cli.prompt.as_deref(), Some("what is rag?"));
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["agent-playground"]);
        let mut config = Config::default();
        config.top_k = 5;

        let config = cli.apply(config);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.provider, ProviderKind::Echo);
        assert!(cli.prompt.is_none());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
