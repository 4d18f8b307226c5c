use anyhow::Context;
use chat_api::{
    ChatApiClient, ChatApiConfig, ChatApiError, ChatMessage, ChatRequest, ChatResponse, Usage,
};
use helm_tui::{Style, Terminal};
use thiserror::Error;

use crate::console::print_block;
use crate::thinking::strip_thinking;
use crate::tools::{tool_definitions, ToolExecutor, ToolInvocation};

pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 4096;

/// One request/response exchange with the model.
pub trait ChatBackend {
    fn complete(&mut self, request: &ChatRequest) -> Result<ChatResponse, ChatApiError>;
}

/// [`ChatBackend`] over HTTP, blocking on a private current-thread runtime.
#[derive(Debug)]
pub struct HttpChatBackend {
    client: ChatApiClient,
    runtime: tokio::runtime::Runtime,
}

impl HttpChatBackend {
    pub fn new(config: ChatApiConfig) -> anyhow::Result<Self> {
        let client = ChatApiClient::new(config).context("failed to build HTTP client")?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to initialize tokio runtime")?;
        Ok(Self { client, runtime })
    }
}

impl ChatBackend for HttpChatBackend {
    fn complete(&mut self, request: &ChatRequest) -> Result<ChatResponse, ChatApiError> {
        self.runtime.block_on(self.client.complete(request))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub content: String,
    pub usage: Usage,
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Transport(#[from] ChatApiError),
    #[error("response contained no choices")]
    NoChoice,
    #[error("stopped after {limit} tool rounds without a final answer")]
    RoundLimit { limit: u32 },
}

/// Drives model round-trips for one user message until the model answers.
pub struct ChatLoop<B, T> {
    backend: B,
    tools: T,
    model: String,
    max_tool_rounds: Option<u32>,
    style: Style,
}

impl<B: ChatBackend, T: ToolExecutor> ChatLoop<B, T> {
    pub fn new(backend: B, tools: T, model: impl Into<String>) -> Self {
        Self {
            backend,
            tools,
            model: model.into(),
            max_tool_rounds: None,
            style: Style::plain(),
        }
    }

    /// `None` lets the model request tools for as many rounds as it likes.
    pub fn with_max_tool_rounds(mut self, limit: Option<u32>) -> Self {
        self.max_tool_rounds = limit;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut String {
        &mut self.model
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    /// Sends the system prompt plus `conversation`, executing tool calls until a final answer.
    ///
    /// Tool-call and tool-result entries only live in this turn's working transcript; the
    /// caller records the returned content. Errors are printed before they are returned.
    pub fn run_turn(
        &mut self,
        terminal: &mut dyn Terminal,
        system_prompt: &str,
        conversation: &[ChatMessage],
    ) -> Result<TurnResult, TurnError> {
        let mut transcript = Vec::with_capacity(conversation.len() + 1);
        transcript.push(ChatMessage::system(system_prompt));
        transcript.extend_from_slice(conversation);

        let mut rounds = 0u32;
        loop {
            let request = ChatRequest::new(self.model.clone(), transcript)
                .with_tools(tool_definitions())
                .with_temperature(TEMPERATURE)
                .with_max_tokens(MAX_TOKENS);
            let response = self.backend.complete(&request);
            transcript = request.messages;

            let response = match response {
                Ok(response) => response,
                Err(error) => return Err(self.report(terminal, error.into())),
            };
            let Some(choice) = response.first_choice() else {
                return Err(self.report(terminal, TurnError::NoChoice));
            };

            let message = &choice.message;
            let text = strip_thinking(message.content.as_deref().unwrap_or_default());
            if message.tool_calls.is_empty() || choice.is_stop() {
                if !text.is_empty() {
                    print_block(terminal, &text);
                }
                let usage = response.usage_or_default();
                tracing::info!(
                    rounds,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "turn finished"
                );
                return Ok(TurnResult {
                    content: text,
                    usage,
                });
            }

            if let Some(limit) = self.max_tool_rounds {
                if rounds >= limit {
                    return Err(self.report(terminal, TurnError::RoundLimit { limit }));
                }
            }
            rounds += 1;

            if !text.is_empty() {
                print_block(terminal, &text);
            }
            tracing::debug!(round = rounds, calls = message.tool_calls.len(), "tool round");
            transcript.push(ChatMessage::assistant_tool_calls(
                message.content.clone(),
                message.tool_calls.clone(),
            ));
            for call in &message.tool_calls {
                let invocation = ToolInvocation::from_call(&call.function);
                let result = self.tools.execute(terminal, &invocation);
                transcript.push(ChatMessage::tool_result(call.id.clone(), result.output));
            }
        }
    }

    fn report(&self, terminal: &mut dyn Terminal, error: TurnError) -> TurnError {
        tracing::error!(%error, model = %self.model, "turn failed");
        print_block(terminal, &self.style.red(&format!("Error: {error}")));
        error
    }
}
