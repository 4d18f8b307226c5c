mod support;

use chat_api::{ChatApiError, ChatMessage, ChatResponse, ToolCall};
use helm::chat_loop::{ChatLoop, TurnError, MAX_TOKENS, TEMPERATURE};
use helm::tools::{ToolInvocation, ToolResult, DENIED_MESSAGE};
use helm_tui::testing::ScriptedTerminal;
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{answer, tool_round, usage, RecordingExecutor, ScriptedBackend};

fn chat(
    responses: Vec<Result<ChatResponse, ChatApiError>>,
    results: Vec<ToolResult>,
) -> ChatLoop<ScriptedBackend, RecordingExecutor> {
    ChatLoop::new(
        ScriptedBackend::new(responses),
        RecordingExecutor::new(results),
        "test-model",
    )
}

#[test]
fn final_answer_returns_content_and_usage() {
    let mut chat = chat(vec![Ok(answer("All good.", Some(usage(12, 3, 15))))], vec![]);
    let mut terminal = ScriptedTerminal::piped();

    let result = chat
        .run_turn(&mut terminal, "be brief", &[ChatMessage::user("status?")])
        .expect("turn should succeed");

    assert_eq!(result.content, "All good.");
    assert_eq!(result.usage, usage(12, 3, 15));
    assert_eq!(terminal.output(), "All good.\n");

    let request = &chat.backend().requests[0];
    assert_eq!(request.model, "test-model");
    assert_eq!(request.messages[0], ChatMessage::system("be brief"));
    assert_eq!(request.messages[1], ChatMessage::user("status?"));
    assert_eq!(request.tools.len(), 2);
    assert_eq!(request.temperature, Some(TEMPERATURE));
    assert_eq!(request.max_tokens, Some(MAX_TOKENS));
}

#[test]
fn missing_usage_is_zero_filled() {
    let mut chat = chat(vec![Ok(answer("hi", None))], vec![]);
    let result = chat
        .run_turn(&mut ScriptedTerminal::piped(), "", &[])
        .expect("turn should succeed");
    assert_eq!(result.usage, usage(0, 0, 0));
}

#[test]
fn every_tool_call_gets_one_result_in_order() {
    let calls = vec![
        ToolCall::new("call_a", "run_command", json!({"command": "ls"})),
        ToolCall::new(
            "call_b",
            "write_file",
            json!("{\"path\":\"notes.txt\",\"content\":\"x\"}"),
        ),
        ToolCall::new("call_c", "launch_rockets", json!({})),
    ];
    let mut chat = chat(
        vec![
            Ok(tool_round(Some("Let me look."), calls.clone())),
            Ok(answer("Done.", Some(usage(40, 8, 48)))),
        ],
        vec![
            ToolResult::ok("Cargo.toml"),
            ToolResult::fail(DENIED_MESSAGE),
            ToolResult::fail("Unknown tool: launch_rockets"),
        ],
    );
    let mut terminal = ScriptedTerminal::piped();

    let result = chat
        .run_turn(&mut terminal, "sys", &[ChatMessage::user("tidy up")])
        .expect("turn should succeed");
    assert_eq!(result.content, "Done.");
    assert_eq!(result.usage, usage(40, 8, 48));

    assert_eq!(
        chat.tools().invocations,
        vec![
            ToolInvocation::RunCommand {
                command: "ls".to_string()
            },
            ToolInvocation::WriteFile {
                path: "notes.txt".to_string(),
                content: "x".to_string()
            },
            ToolInvocation::Unknown {
                name: "launch_rockets".to_string()
            },
        ]
    );

    let requests = &chat.backend().requests;
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].messages[2..],
        [
            ChatMessage::assistant_tool_calls(Some("Let me look.".to_string()), calls),
            ChatMessage::tool_result("call_a", "Cargo.toml"),
            ChatMessage::tool_result("call_b", DENIED_MESSAGE),
            ChatMessage::tool_result("call_c", "Unknown tool: launch_rockets"),
        ]
    );
    assert!(terminal.output().starts_with("Let me look.\n"));
}

#[test]
fn stop_reason_ends_the_turn_even_with_tool_calls() {
    let mut response = tool_round(
        Some("final"),
        vec![ToolCall::new("call_1", "run_command", json!({"command": "rm -rf /"}))],
    );
    response.choices[0].finish_reason = Some("stop".to_string());
    let mut chat = chat(vec![Ok(response)], vec![]);

    let result = chat
        .run_turn(&mut ScriptedTerminal::piped(), "", &[])
        .expect("turn should succeed");
    assert_eq!(result.content, "final");
    assert!(chat.tools().invocations.is_empty());
}

#[test]
fn malformed_arguments_dispatch_with_empty_fields() {
    let mut chat = chat(
        vec![
            Ok(tool_round(
                None,
                vec![ToolCall::new("call_1", "run_command", json!("{oops"))],
            )),
            Ok(answer("ok", None)),
        ],
        vec![],
    );
    chat.run_turn(&mut ScriptedTerminal::piped(), "", &[])
        .expect("turn should succeed");
    assert_eq!(
        chat.tools().invocations,
        vec![ToolInvocation::RunCommand {
            command: String::new()
        }]
    );
}

#[test]
fn thinking_spans_are_stripped_from_printed_and_returned_text() {
    let mut chat = chat(
        vec![
            Ok(tool_round(
                Some("<think>plan it</think>Checking files"),
                vec![ToolCall::new("call_1", "run_command", json!({"command": "ls"}))],
            )),
            Ok(answer("<thinking>hmm</thinking>\nThere are two files.\n<think>leftover", None)),
        ],
        vec![],
    );
    let mut terminal = ScriptedTerminal::piped();
    let result = chat
        .run_turn(&mut terminal, "", &[])
        .expect("turn should succeed");

    assert_eq!(result.content, "There are two files.");
    assert_eq!(terminal.output(), "Checking files\nThere are two files.\n");
}

#[test]
fn transport_error_aborts_the_turn() {
    let mut chat = chat(vec![Err(ChatApiError::Timeout)], vec![]);
    let mut terminal = ScriptedTerminal::piped();
    let error = chat
        .run_turn(&mut terminal, "", &[ChatMessage::user("hi")])
        .expect_err("turn should fail");
    assert!(matches!(error, TurnError::Transport(ChatApiError::Timeout)));
    assert!(terminal.output().contains("Error: request timed out"));
}

#[test]
fn empty_choices_abort_the_turn() {
    let mut chat = chat(vec![Ok(ChatResponse::default())], vec![]);
    let mut terminal = ScriptedTerminal::piped();
    let error = chat
        .run_turn(&mut terminal, "", &[])
        .expect_err("turn should fail");
    assert!(matches!(error, TurnError::NoChoice));
    assert!(terminal.output().contains("Error:"));
}

#[test]
fn round_limit_is_opt_in() {
    let round = || {
        Ok(tool_round(
            None,
            vec![ToolCall::new("call", "run_command", json!({"command": "date"}))],
        ))
    };

    let mut limited = chat(vec![round(), round(), round()], vec![]).with_max_tool_rounds(Some(2));
    let error = limited
        .run_turn(&mut ScriptedTerminal::piped(), "", &[])
        .expect_err("third round should exceed the limit");
    assert!(matches!(error, TurnError::RoundLimit { limit: 2 }));
    assert_eq!(limited.tools().invocations.len(), 2);

    let mut unlimited = chat(
        vec![round(), round(), round(), Ok(answer("finally", None))],
        vec![],
    );
    let result = unlimited
        .run_turn(&mut ScriptedTerminal::piped(), "", &[])
        .expect("unlimited turn should finish");
    assert_eq!(result.content, "finally");
    assert_eq!(unlimited.tools().invocations.len(), 3);
}
