//! Interactive read-eval loop and one-shot mode.

use std::io;

use agent_store::AgentStore;
use chat_api::ChatMessage;
use helm_tui::{
    read_interactive_line, read_plain_line, select_from_list_with, EnvConfig, LineInput, Style,
    Terminal, COMMAND_PREFIX,
};

use crate::chat_loop::{ChatBackend, ChatLoop};
use crate::commands::{self, palette_dialog, CommandContext, CommandOutcome, SlashCommand};
use crate::config::{HelmPaths, ResolvedConfig};
use crate::console::{print_block, print_line};
use crate::project::ProjectContext;
use crate::prompt::{banner, system_prompt};
use crate::session::Session;
use crate::tools::ToolExecutor;

pub const PROMPT: &str = "› ";
pub const CONTINUATION_PROMPT: &str = "… ";
/// A line holding only this opens and closes multi-line input.
pub const FENCE: &str = "```";

/// Read-only state shared by the REPL and command handlers.
pub struct AppContext {
    pub config: ResolvedConfig,
    pub paths: HelmPaths,
    pub project: ProjectContext,
    pub agents: AgentStore,
    pub style: Style,
    pub ui: EnvConfig,
}

/// Runs until end of input or `/exit` and returns the final session.
pub fn run_interactive<B, T>(
    terminal: &mut dyn Terminal,
    chat: &mut ChatLoop<B, T>,
    app: &AppContext,
) -> io::Result<Session>
where
    B: ChatBackend,
    T: ToolExecutor,
{
    let system_prompt = system_prompt(&app.project);
    print_block(terminal, &banner(&app.style, chat.model(), &app.project));
    let mut session = Session::new();
    let prompt = app.style.cyan(PROMPT);

    loop {
        let outcome = match read_interactive_line(terminal, &prompt)? {
            LineInput::Eof => break,
            LineInput::SlashTrigger => {
                let chosen = select_from_list_with(terminal, &palette_dialog(), &app.ui)?;
                match chosen.and_then(|index| SlashCommand::ALL.get(index).copied()) {
                    Some(command) => commands::execute(
                        command,
                        "",
                        &mut command_context(terminal, &mut session, chat, app),
                    ),
                    None => CommandOutcome::Continue,
                }
            }
            LineInput::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.starts_with(COMMAND_PREFIX) {
                    commands::dispatch(
                        trimmed,
                        &mut command_context(terminal, &mut session, chat, app),
                    )
                } else {
                    let message = if trimmed == FENCE {
                        match read_multiline(terminal, &app.style)? {
                            Some(message) => message,
                            None => continue,
                        }
                    } else {
                        text
                    };
                    if !message.trim().is_empty() {
                        submit(terminal, chat, &mut session, &system_prompt, message);
                    }
                    CommandOutcome::Continue
                }
            }
        };
        if outcome == CommandOutcome::Exit {
            break;
        }
    }

    tracing::info!(messages = session.len(), "interactive session ended");
    Ok(session)
}

/// Sends a single prompt with no history. Returns whether the turn succeeded.
pub fn run_once<B, T>(
    terminal: &mut dyn Terminal,
    chat: &mut ChatLoop<B, T>,
    project: &ProjectContext,
    prompt: &str,
) -> bool
where
    B: ChatBackend,
    T: ToolExecutor,
{
    let system_prompt = system_prompt(project);
    chat.run_turn(terminal, &system_prompt, &[ChatMessage::user(prompt)])
        .is_ok()
}

fn submit<B, T>(
    terminal: &mut dyn Terminal,
    chat: &mut ChatLoop<B, T>,
    session: &mut Session,
    system_prompt: &str,
    message: String,
) where
    B: ChatBackend,
    T: ToolExecutor,
{
    session.push_user(message);
    let conversation = session.conversation();
    if let Ok(result) = chat.run_turn(terminal, system_prompt, &conversation) {
        if !result.content.is_empty() {
            session.push_assistant(result.content);
        }
        session.add_usage(result.usage);
    }
}

/// Collects lines until a lone fence. End of input cancels the message.
fn read_multiline(terminal: &mut dyn Terminal, style: &Style) -> io::Result<Option<String>> {
    print_line(
        terminal,
        &style.dim("Multi-line input: finish with ``` on its own line."),
    );
    let mut lines = Vec::new();
    loop {
        match read_plain_line(terminal, CONTINUATION_PROMPT)? {
            LineInput::Text(line) if line.trim() == FENCE => return Ok(Some(lines.join("\n"))),
            LineInput::Text(line) => lines.push(line),
            LineInput::SlashTrigger | LineInput::Eof => {
                print_line(terminal, &style.dim("Cancelled."));
                return Ok(None);
            }
        }
    }
}

fn command_context<'a, B, T>(
    terminal: &'a mut dyn Terminal,
    session: &'a mut Session,
    chat: &'a mut ChatLoop<B, T>,
    app: &'a AppContext,
) -> CommandContext<'a>
where
    B: ChatBackend,
    T: ToolExecutor,
{
    CommandContext {
        terminal,
        session,
        model: chat.model_mut(),
        style: &app.style,
        ui: &app.ui,
        config: &app.config,
        paths: &app.paths,
        project: &app.project,
        agents: &app.agents,
    }
}
