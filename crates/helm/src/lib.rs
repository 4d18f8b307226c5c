//! `helm`: an interactive terminal assistant.
//!
//! The binary wires a [`chat_loop::ChatLoop`] (model round-trips plus confirmed tool calls)
//! to the raw-terminal primitives in `helm_tui`, with project context gathered once at start.

pub mod agents;
pub mod chat_loop;
pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod logging;
pub mod login;
pub mod project;
pub mod prompt;
pub mod repl;
pub mod session;
pub mod settings;
pub mod thinking;
pub mod tools;

use std::env;
use std::process::ExitCode;

use agent_store::AgentStore;
use anyhow::Context;
use helm_tui::{EnvConfig, ProcessTerminal, Style};

use crate::chat_loop::{ChatLoop, HttpChatBackend};
use crate::cli::{Cli, Command};
use crate::config::{ConfigLayers, HelmPaths};
use crate::project::ProjectContext;
use crate::repl::AppContext;
use crate::tools::ToolDispatcher;

/// Runs the parsed command line and returns the process exit code.
pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let paths = HelmPaths::discover()?;
    let _log_guard = logging::init(&paths);
    let cwd = env::current_dir().context("failed to read the working directory")?;
    tracing::info!(cwd = %cwd.display(), command = ?cli.command, "helm starting");

    let layers = ConfigLayers::load(&paths, &cwd)?;
    let style = Style::from_env();
    let ui = EnvConfig::from_env();
    let mut terminal = ProcessTerminal::new();

    match cli.command {
        Some(Command::Login) => {
            let saved = login::run_login(&mut terminal, &style, &ui, &paths, &layers)?;
            return Ok(exit_code(saved));
        }
        Some(Command::Config) => {
            let config = layers.resolve()?;
            for line in config.report_lines(&paths) {
                println!("{line}");
            }
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    let config = layers.resolve()?;
    let backend = HttpChatBackend::new(config.chat_api_config()?)?;
    let tools = ToolDispatcher::new(&cwd).with_style(style);
    let mut chat = ChatLoop::new(backend, tools, config.model.value.clone())
        .with_max_tool_rounds(config.max_tool_rounds())
        .with_style(style);
    let project = ProjectContext::scan(&cwd);

    if let Some(prompt) = cli.one_shot_prompt() {
        let succeeded = repl::run_once(&mut terminal, &mut chat, &project, &prompt);
        return Ok(exit_code(succeeded));
    }

    let app = AppContext {
        agents: AgentStore::for_workspace(&cwd, dirs::home_dir().as_deref()),
        config,
        paths,
        project,
        style,
        ui,
    };
    repl::run_interactive(&mut terminal, &mut chat, &app).context("terminal I/O failed")?;
    Ok(ExitCode::SUCCESS)
}

fn exit_code(succeeded: bool) -> ExitCode {
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
