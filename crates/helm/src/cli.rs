use clap::{Parser, Subcommand};

/// Terminal assistant for the current project.
///
/// Without arguments helm starts an interactive session. With a prompt it answers once and
/// exits.
#[derive(Debug, Parser)]
#[command(name = "helm", version, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Prompt for a single turn; words are joined with spaces.
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Store an API key, base URL and model in the settings file.
    Login,
    /// Print the resolved configuration and where each value came from.
    Config,
}

impl Cli {
    /// One-shot prompt, when one was given and is not blank.
    pub fn one_shot_prompt(&self) -> Option<String> {
        let prompt = self.prompt.join(" ");
        let prompt = prompt.trim();
        (!prompt.is_empty()).then(|| prompt.to_string())
    }
}
