#![allow(dead_code)]

use std::collections::VecDeque;

use chat_api::{
    ChatApiError, ChatRequest, ChatResponse, Choice, ResponseMessage, ToolCall, Usage,
};
use helm::chat_loop::ChatBackend;
use helm::tools::{ToolExecutor, ToolInvocation, ToolResult};
use helm_tui::Terminal;

/// Replays canned responses and records every request it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: VecDeque<Result<ChatResponse, ChatApiError>>,
    pub requests: Vec<ChatRequest>,
}

impl ScriptedBackend {
    pub fn new(responses: impl IntoIterator<Item = Result<ChatResponse, ChatApiError>>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            requests: Vec::new(),
        }
    }
}

impl ChatBackend for ScriptedBackend {
    fn complete(&mut self, request: &ChatRequest) -> Result<ChatResponse, ChatApiError> {
        self.requests.push(request.clone());
        self.responses
            .pop_front()
            .unwrap_or(Err(ChatApiError::Timeout))
    }
}

/// Records invocations and answers from a queue, `ok("done")` once it runs dry.
#[derive(Default)]
pub struct RecordingExecutor {
    results: VecDeque<ToolResult>,
    pub invocations: Vec<ToolInvocation>,
}

impl RecordingExecutor {
    pub fn new(results: impl IntoIterator<Item = ToolResult>) -> Self {
        Self {
            results: results.into_iter().collect(),
            invocations: Vec::new(),
        }
    }
}

impl ToolExecutor for RecordingExecutor {
    fn execute(&mut self, _terminal: &mut dyn Terminal, invocation: &ToolInvocation) -> ToolResult {
        self.invocations.push(invocation.clone());
        self.results
            .pop_front()
            .unwrap_or_else(|| ToolResult::ok("done"))
    }
}

pub fn usage(prompt: u64, completion: u64, total: u64) -> Usage {
    Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: total,
    }
}

pub fn answer(content: &str, usage: Option<Usage>) -> ChatResponse {
    ChatResponse {
        choices: vec![Choice {
            message: ResponseMessage {
                content: Some(content.to_string()),
                tool_calls: Vec::new(),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage,
    }
}

pub fn tool_round(content: Option<&str>, calls: Vec<ToolCall>) -> ChatResponse {
    ChatResponse {
        choices: vec![Choice {
            message: ResponseMessage {
                content: content.map(str::to_string),
                tool_calls: calls,
            },
            finish_reason: Some("tool_calls".to_string()),
        }],
        usage: None,
    }
}

/// Temporary project and home directories plus an [`AppContext`] pointing at them.
pub struct Fixture {
    pub project: tempfile::TempDir,
    pub home: tempfile::TempDir,
    pub app: helm::repl::AppContext,
}

pub fn fixture() -> Fixture {
    let project = tempfile::tempdir().expect("project tempdir should be created");
    let home = tempfile::tempdir().expect("home tempdir should be created");
    let app = helm::repl::AppContext {
        config: helm::config::ConfigLayers::default()
            .resolve()
            .expect("defaults should resolve"),
        paths: helm::config::HelmPaths::new(home.path().join(".helm")),
        project: helm::project::ProjectContext::scan(project.path()),
        agents: agent_store::AgentStore::for_workspace(project.path(), Some(home.path())),
        style: helm_tui::Style::plain(),
        ui: helm_tui::EnvConfig {
            box_width: 48,
            color: false,
        },
    };
    Fixture { project, home, app }
}
