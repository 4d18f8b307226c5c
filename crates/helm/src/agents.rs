use std::collections::BTreeSet;

use agent_store::{validate_agent_name, AgentScope, AgentStore, StoredAgent};
use anyhow::Context;
use helm_tui::{
    prompt_text_with, select_from_list_with, EnvConfig, SelectDialog, Style, Terminal, TextPrompt,
};

use crate::console::print_line;
use crate::tools::{RUN_COMMAND, WRITE_FILE};

const TOOL_CHOICES: [(&str, &[&str]); 4] = [
    ("All tools", &[RUN_COMMAND, WRITE_FILE]),
    ("run_command only", &[RUN_COMMAND]),
    ("write_file only", &[WRITE_FILE]),
    ("No tools", &[]),
];

/// `/agents`: pick create or list, then run that flow.
pub fn manage_agents(
    terminal: &mut dyn Terminal,
    style: &Style,
    ui: &EnvConfig,
    store: &AgentStore,
    session_model: &str,
) -> anyhow::Result<()> {
    let menu = SelectDialog::new(
        "Agents",
        vec!["Create agent".to_string(), "List agents".to_string()],
    )
    .with_subtitle("Custom agents are saved for later use");
    match select_from_list_with(terminal, &menu, ui).context("agents menu failed")? {
        Some(0) => create_agent(terminal, style, ui, store, session_model),
        Some(_) => {
            list_agents(terminal, style, store)?;
            Ok(())
        }
        None => Ok(()),
    }
}

fn create_agent(
    terminal: &mut dyn Terminal,
    style: &Style,
    ui: &EnvConfig,
    store: &AgentStore,
    session_model: &str,
) -> anyhow::Result<()> {
    let name_prompt = TextPrompt::new("Agent name")
        .with_subtitle("Lowercase letters, digits, - and _")
        .with_placeholder("e.g. reviewer");
    let Some(name) = prompt_text_with(terminal, &name_prompt, ui)? else {
        return cancelled(terminal, style);
    };
    let name = name.trim().to_string();
    if let Err(error) = validate_agent_name(&name) {
        print_line(terminal, &style.red(&error.to_string()));
        return Ok(());
    }

    let description_prompt = TextPrompt::new("Description")
        .with_subtitle(format!("What should {name} do?"))
        .with_placeholder("e.g. Reviews diffs for bugs");
    let Some(description) = prompt_text_with(terminal, &description_prompt, ui)? else {
        return cancelled(terminal, style);
    };

    let model_prompt = TextPrompt::new("Model")
        .with_subtitle("Leave empty to inherit the session model")
        .with_placeholder(session_model);
    let Some(model) = prompt_text_with(terminal, &model_prompt, ui)? else {
        return cancelled(terminal, style);
    };

    let tool_dialog = SelectDialog::new(
        "Tools",
        TOOL_CHOICES
            .iter()
            .map(|(label, _)| label.to_string())
            .collect(),
    )
    .with_subtitle(format!("Capabilities {name} may use"));
    let Some(tool_choice) = select_from_list_with(terminal, &tool_dialog, ui)? else {
        return cancelled(terminal, style);
    };
    let tools: BTreeSet<String> = TOOL_CHOICES
        .get(tool_choice)
        .map(|(_, tools)| *tools)
        .unwrap_or_default()
        .iter()
        .map(|tool| tool.to_string())
        .collect();

    let scope_dialog = SelectDialog::new(
        "Scope",
        vec![
            "Project (.helm/agents in this directory)".to_string(),
            "Personal (~/.helm/agents)".to_string(),
        ],
    )
    .with_subtitle("Where to save the agent");
    let Some(scope_choice) = select_from_list_with(terminal, &scope_dialog, ui)? else {
        return cancelled(terminal, style);
    };
    let scope = if scope_choice == 0 {
        AgentScope::Project
    } else {
        AgentScope::Personal
    };

    match store.create(scope, &name, &description, Some(model), tools) {
        Ok(stored) => print_line(
            terminal,
            &style.green(&format!(
                "Created {scope} agent {} at {}",
                stored.record.name,
                stored.path.display()
            )),
        ),
        Err(error) => print_line(
            terminal,
            &style.red(&format!("Could not create agent: {error}")),
        ),
    }
    Ok(())
}

fn list_agents(
    terminal: &mut dyn Terminal,
    style: &Style,
    store: &AgentStore,
) -> anyhow::Result<()> {
    let agents = store.list().context("failed to list agents")?;
    if agents.is_empty() {
        print_line(terminal, "No agents defined. Use /agents → Create agent.");
        return Ok(());
    }
    for agent in &agents {
        print_line(terminal, &describe_agent(style, agent));
    }
    Ok(())
}

fn describe_agent(style: &Style, agent: &StoredAgent) -> String {
    let record = &agent.record;
    let tools = if record.tools.is_empty() {
        "none".to_string()
    } else {
        record.tools.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let model = record.model.as_deref().unwrap_or("inherit");
    let mut line = format!(
        "{} {}",
        style.bold(&record.name),
        style.dim(&format!("[{}]", agent.scope))
    );
    if !record.description.is_empty() {
        line.push_str(&format!(" {}", record.description));
    }
    line.push_str(&style.dim(&format!(" · model {model} · tools {tools}")));
    line
}

fn cancelled(terminal: &mut dyn Terminal, style: &Style) -> anyhow::Result<()> {
    print_line(terminal, &style.dim("Cancelled."));
    Ok(())
}
