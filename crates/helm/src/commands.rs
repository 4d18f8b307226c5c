use agent_store::AgentStore;
use helm_tui::{EnvConfig, SelectDialog, Style, Terminal};

use crate::agents::manage_agents;
use crate::config::{HelmPaths, ResolvedConfig};
use crate::console::{print_block, print_line};
use crate::project::{directory_listing, ProjectContext, MAX_DEPTH, MAX_ENTRIES};
use crate::session::{CompactOutcome, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Clear,
    Agents,
    Config,
    Model,
    Tree,
    Cost,
    Compact,
    New,
    Exit,
}

impl SlashCommand {
    pub const ALL: [SlashCommand; 10] = [
        Self::Help,
        Self::Clear,
        Self::Agents,
        Self::Config,
        Self::Model,
        Self::Tree,
        Self::Cost,
        Self::Compact,
        Self::New,
        Self::Exit,
    ];

    /// Name without the leading slash.
    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Clear => "clear",
            Self::Agents => "agents",
            Self::Config => "config",
            Self::Model => "model",
            Self::Tree => "tree",
            Self::Cost => "cost",
            Self::Compact => "compact",
            Self::New => "new",
            Self::Exit => "exit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Help => "Show available commands",
            Self::Clear => "Clear the screen",
            Self::Agents => "Create or list custom agents",
            Self::Config => "Show the resolved configuration",
            Self::Model => "Show the model, or switch with /model <name>",
            Self::Tree => "Show the project file tree",
            Self::Cost => "Show token usage for this session",
            Self::Compact => "Keep only the most recent messages",
            Self::New => "Start a new conversation",
            Self::Exit => "Quit helm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Command { command: SlashCommand, args: String },
    Ambiguous(Vec<SlashCommand>),
    Unknown(String),
}

/// Resolves the first whitespace token of `input`: exact name, then unique prefix.
pub fn resolve(input: &str) -> Resolution {
    let trimmed = input.trim();
    let (token, args) = match trimmed.split_once(char::is_whitespace) {
        Some((token, args)) => (token, args.trim()),
        None => (trimmed, ""),
    };
    let name = token.strip_prefix('/').unwrap_or(token);

    let command_with_args = |command| Resolution::Command {
        command,
        args: args.to_string(),
    };
    if let Some(command) = SlashCommand::ALL
        .into_iter()
        .find(|command| command.name() == name)
    {
        return command_with_args(command);
    }

    let candidates: Vec<SlashCommand> = SlashCommand::ALL
        .into_iter()
        .filter(|command| command.name().starts_with(name))
        .collect();
    match candidates.as_slice() {
        [] => Resolution::Unknown(token.to_string()),
        [command] => command_with_args(*command),
        _ => Resolution::Ambiguous(candidates),
    }
}

/// Command palette listing the whole catalog in order.
pub fn palette_dialog() -> SelectDialog {
    let width = SlashCommand::ALL
        .iter()
        .map(|command| command.name().len())
        .max()
        .unwrap_or_default();
    let items = SlashCommand::ALL
        .iter()
        .map(|command| {
            format!(
                "/{:<width$}  {}",
                command.name(),
                command.description()
            )
        })
        .collect();
    SelectDialog::new("Commands", items).with_subtitle("Run a slash command")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

/// Everything a command handler may read or change.
pub struct CommandContext<'a> {
    pub terminal: &'a mut dyn Terminal,
    pub session: &'a mut Session,
    pub model: &'a mut String,
    pub style: &'a Style,
    pub ui: &'a EnvConfig,
    pub config: &'a ResolvedConfig,
    pub paths: &'a HelmPaths,
    pub project: &'a ProjectContext,
    pub agents: &'a AgentStore,
}

/// Resolves and runs `input`, reporting ambiguity or unknown names without running anything.
pub fn dispatch(input: &str, context: &mut CommandContext<'_>) -> CommandOutcome {
    match resolve(input) {
        Resolution::Command { command, args } => execute(command, &args, context),
        Resolution::Ambiguous(candidates) => {
            let names: Vec<String> = candidates
                .iter()
                .map(|command| format!("/{}", command.name()))
                .collect();
            tracing::debug!(input, "ambiguous command");
            print_line(
                context.terminal,
                &context
                    .style
                    .yellow(&format!("Ambiguous command. Did you mean: {}", names.join(", "))),
            );
            CommandOutcome::Continue
        }
        Resolution::Unknown(token) => {
            tracing::debug!(input, "unknown command");
            print_line(
                context.terminal,
                &context.style.yellow(&format!(
                    "Unknown command: {token}. Type /help for the list."
                )),
            );
            CommandOutcome::Continue
        }
    }
}

pub fn execute(
    command: SlashCommand,
    args: &str,
    context: &mut CommandContext<'_>,
) -> CommandOutcome {
    tracing::info!(command = command.name(), "slash command");
    match command {
        SlashCommand::Help => show_help(context),
        SlashCommand::Clear => context.terminal.write("\x1b[2J\x1b[H"),
        SlashCommand::Agents => {
            if let Err(error) = manage_agents(
                context.terminal,
                context.style,
                context.ui,
                context.agents,
                context.model,
            ) {
                tracing::warn!(%error, "agent dialog failed");
                print_line(
                    context.terminal,
                    &context.style.red(&format!("Error: {error:#}")),
                );
            }
        }
        SlashCommand::Config => show_config(context),
        SlashCommand::Model => {
            if !args.is_empty() {
                *context.model = args.to_string();
                tracing::info!(model = args, "model switched");
            }
            print_line(context.terminal, &format!("Model: {}", context.model));
        }
        SlashCommand::Tree => {
            let listing = directory_listing(&context.project.root, MAX_DEPTH, MAX_ENTRIES);
            print_line(
                context.terminal,
                &context.style.bold(&context.project.root.display().to_string()),
            );
            print_block(context.terminal, &listing);
        }
        SlashCommand::Cost => {
            let session = &*context.session;
            let report = format!(
                "Tokens: {} prompt · {} completion · {} total",
                session.prompt_tokens, session.completion_tokens, session.total_tokens
            );
            print_line(context.terminal, &report);
        }
        SlashCommand::Compact => {
            let message = match context.session.compact() {
                CompactOutcome::Compacted { removed } => {
                    format!("Compacted history: removed {removed} messages, kept the last 4.")
                }
                CompactOutcome::AlreadyShort => "History is already short.".to_string(),
            };
            print_line(context.terminal, &message);
        }
        SlashCommand::New => {
            context.session.reset();
            print_line(context.terminal, "Started a new conversation.");
        }
        SlashCommand::Exit => return CommandOutcome::Exit,
    }
    CommandOutcome::Continue
}

fn show_help(context: &mut CommandContext<'_>) {
    print_line(context.terminal, &context.style.bold("Commands"));
    for command in SlashCommand::ALL {
        print_line(
            context.terminal,
            &format!(
                "  /{:<8} {}",
                command.name(),
                context.style.dim(command.description())
            ),
        );
    }
    print_line(
        context.terminal,
        &context.style.dim(
            "Commands accept unique prefixes (/co is ambiguous, /com runs /compact). \
             Enter ``` on its own line for multi-line input. Ctrl+D quits.",
        ),
    );
}

fn show_config(context: &mut CommandContext<'_>) {
    for line in context.config.report_lines(context.paths) {
        print_line(context.terminal, &line);
    }
    if context.config.model.value != *context.model {
        print_line(
            context.terminal,
            &context
                .style
                .dim(&format!("Session model switched to {}", context.model)),
        );
    }
}
