use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use chat_api::{FunctionCall, ToolSpec};
use helm_tui::{confirm, Style, Terminal};
use serde_json::{json, Map, Value};
use wait_timeout::ChildExt;

use crate::console::{print_block, print_line};

pub const RUN_COMMAND: &str = "run_command";
pub const WRITE_FILE: &str = "write_file";

/// Tool output returned to the model whenever the user declines.
pub const DENIED_MESSAGE: &str = "User denied the operation.";

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// How long pipes may keep draining after the command group was killed.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// A tool request with its arguments already pulled out of the JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    RunCommand { command: String },
    WriteFile { path: String, content: String },
    Unknown { name: String },
}

impl ToolInvocation {
    /// Never fails. Missing or non-string fields become empty strings.
    pub fn parse(name: &str, arguments: &Map<String, Value>) -> Self {
        match name {
            RUN_COMMAND => Self::RunCommand {
                command: string_argument(arguments, "command"),
            },
            WRITE_FILE => Self::WriteFile {
                path: string_argument(arguments, "path"),
                content: string_argument(arguments, "content"),
            },
            other => Self::Unknown {
                name: other.to_string(),
            },
        }
    }

    pub fn from_call(call: &FunctionCall) -> Self {
        Self::parse(&call.name, &call.arguments_map())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::RunCommand { .. } => RUN_COMMAND,
            Self::WriteFile { .. } => WRITE_FILE,
            Self::Unknown { name } => name,
        }
    }
}

fn string_argument(arguments: &Map<String, Value>, key: &str) -> String {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub output: String,
    pub success: bool,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    pub fn fail(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: false,
        }
    }
}

pub trait ToolExecutor {
    fn execute(&mut self, terminal: &mut dyn Terminal, invocation: &ToolInvocation) -> ToolResult;
}

/// Function declarations offered to the model with every request.
pub fn tool_definitions() -> Vec<ToolSpec> {
    vec![
        ToolSpec::function(
            RUN_COMMAND,
            "Run a shell command in the project directory and return its output. \
             The user confirms every command before it runs.",
            json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "Command line passed to `sh -c`"
                    }
                },
                "required": ["command"]
            }),
        ),
        ToolSpec::function(
            WRITE_FILE,
            "Create or overwrite a file with the given content. \
             Parent directories are created. The user confirms every write.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File path, relative to the project directory or absolute"
                    },
                    "content": {
                        "type": "string",
                        "description": "Full file content"
                    }
                },
                "required": ["path", "content"]
            }),
        ),
    ]
}

/// Runs confirmed tool requests against the working directory.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    working_dir: PathBuf,
    command_timeout: Duration,
    style: Style,
}

impl ToolDispatcher {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            style: Style::plain(),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn run_command(&self, terminal: &mut dyn Terminal, command: &str) -> ToolResult {
        if command.trim().is_empty() {
            let result = ToolResult::fail("No command provided.");
            self.echo_failure(terminal, &result.output);
            return result;
        }

        print_line(terminal, &self.style.yellow(&format!("$ {command}")));
        if !self.ask(terminal, "Run this command?") {
            return self.denied(terminal);
        }

        tracing::info!(command, "running command");
        let result = self.spawn_and_collect(command);
        if result.success {
            print_block(terminal, &self.style.dim(&result.output));
        } else {
            self.echo_failure(terminal, &result.output);
        }
        tracing::info!(success = result.success, "command finished");
        result
    }

    fn spawn_and_collect(&self, command: &str) -> ToolResult {
        let mut builder = Command::new("sh");
        builder
            .arg("-c")
            .arg(command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            builder.process_group(0);
        }

        let start = Instant::now();
        let mut child = match builder.spawn() {
            Ok(child) => child,
            Err(error) => return ToolResult::fail(format!("Failed to launch command: {error}")),
        };

        // Pipes drain on their own threads so a chatty command never blocks on a full pipe.
        let (sender, events) = mpsc::channel();
        let mut open_pipes = 0;
        open_pipes += drain_pipe(Stream::Stdout, child.stdout.take(), &sender);
        open_pipes += drain_pipe(Stream::Stderr, child.stderr.take(), &sender);
        drop(sender);

        let timeout = self.command_timeout;
        let deadline = start + timeout;
        let mut outcome = match child.wait_timeout(timeout) {
            Ok(Some(status)) => Ok(status),
            Ok(None) => {
                kill_tree(&mut child);
                let _ = child.wait();
                Err(format!("Command timed out after {timeout:?}"))
            }
            Err(error) => {
                kill_tree(&mut child);
                let _ = child.wait();
                Err(format!("Failed waiting for command: {error}"))
            }
        };

        let mut captured = Captured::default();
        let drain_until = if outcome.is_ok() {
            deadline
        } else {
            Instant::now() + KILL_GRACE
        };
        if !captured.collect(&events, open_pipes, drain_until) && outcome.is_ok() {
            // The shell exited but background jobs still hold the pipes open.
            tracing::warn!("command left processes holding its output open, killing group");
            kill_tree(&mut child);
            captured.collect(&events, open_pipes, Instant::now() + KILL_GRACE);
            outcome = Err(format!("Command timed out after {timeout:?}"));
        }

        let mut output = String::from_utf8_lossy(&captured.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&captured.stderr));
        let output = output.trim_end();

        match outcome {
            Ok(status) if status.success() => {
                if output.is_empty() {
                    ToolResult::ok("(completed, no output)")
                } else {
                    ToolResult::ok(output)
                }
            }
            Ok(status) if output.is_empty() => ToolResult::fail(describe_exit(status)),
            Err(description) if output.is_empty() => ToolResult::fail(description),
            _ => ToolResult::fail(output),
        }
    }

    fn write_file(&self, terminal: &mut dyn Terminal, path: &str, content: &str) -> ToolResult {
        if path.trim().is_empty() {
            let result = ToolResult::fail("No path provided.");
            self.echo_failure(terminal, &result.output);
            return result;
        }

        let resolved = self.resolve(path);
        let line_count = content.lines().count();
        print_line(
            terminal,
            &self.style.yellow(&format!(
                "write {} ({line_count} {})",
                resolved.display(),
                if line_count == 1 { "line" } else { "lines" }
            )),
        );
        if !self.ask(terminal, "Write this file?") {
            return self.denied(terminal);
        }

        let result = write_with_parents(&resolved, content)
            .map(|()| ToolResult::ok(format!("Wrote {line_count} lines to {}", resolved.display())))
            .unwrap_or_else(ToolResult::fail);
        if result.success {
            print_line(terminal, &self.style.green(&result.output));
        } else {
            self.echo_failure(terminal, &result.output);
        }
        tracing::info!(path = %resolved.display(), success = result.success, "write_file finished");
        result
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    fn ask(&self, terminal: &mut dyn Terminal, question: &str) -> bool {
        match confirm(terminal, question) {
            Ok(approved) => approved,
            Err(error) => {
                tracing::warn!(%error, "confirmation failed, treating as denial");
                false
            }
        }
    }

    fn denied(&self, terminal: &mut dyn Terminal) -> ToolResult {
        print_line(terminal, &self.style.red(DENIED_MESSAGE));
        tracing::info!("tool call denied");
        ToolResult::fail(DENIED_MESSAGE)
    }

    fn echo_failure(&self, terminal: &mut dyn Terminal, output: &str) {
        print_block(terminal, &self.style.red(output));
    }
}

impl ToolExecutor for ToolDispatcher {
    fn execute(&mut self, terminal: &mut dyn Terminal, invocation: &ToolInvocation) -> ToolResult {
        tracing::info!(tool = invocation.name(), "tool dispatched");
        match invocation {
            ToolInvocation::RunCommand { command } => self.run_command(terminal, command),
            ToolInvocation::WriteFile { path, content } => self.write_file(terminal, path, content),
            ToolInvocation::Unknown { name } => {
                let result = ToolResult::fail(format!("Unknown tool: {name}"));
                self.echo_failure(terminal, &result.output);
                result
            }
        }
    }
}

fn write_with_parents(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create parent directories {}: {error}",
                parent.display()
            )
        })?;
    }
    fs::write(path, content)
        .map_err(|error| format!("Failed to write {}: {error}", path.display()))
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

enum PipeEvent {
    Data(Stream, Vec<u8>),
    Closed,
}

#[derive(Debug, Default)]
struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    closed: usize,
}

impl Captured {
    /// Receives pipe output until `open_pipes` have closed or `deadline` passes.
    ///
    /// Returns `false` when the deadline cut the drain short.
    fn collect(
        &mut self,
        events: &Receiver<PipeEvent>,
        open_pipes: usize,
        deadline: Instant,
    ) -> bool {
        while self.closed < open_pipes {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match events.recv_timeout(remaining) {
                Ok(PipeEvent::Data(Stream::Stdout, bytes)) => self.stdout.extend(bytes),
                Ok(PipeEvent::Data(Stream::Stderr, bytes)) => self.stderr.extend(bytes),
                Ok(PipeEvent::Closed) => self.closed += 1,
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
        true
    }
}

/// Spawns a reader forwarding chunks of `pipe`. Returns how many pipes were started.
fn drain_pipe(
    stream: Stream,
    pipe: Option<impl Read + Send + 'static>,
    sender: &Sender<PipeEvent>,
) -> usize {
    let Some(mut pipe) = pipe else {
        return 0;
    };
    let sender = sender.clone();
    thread::spawn(move || {
        let mut buffer = [0_u8; 8192];
        loop {
            match pipe.read(&mut buffer) {
                Ok(0) => break,
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
                Ok(read) => {
                    if sender.send(PipeEvent::Data(stream, buffer[..read].to_vec())).is_err() {
                        return;
                    }
                }
            }
        }
        let _ = sender.send(PipeEvent::Closed);
    });
    1
}

/// Kills the command and anything it started, so inherited pipes close.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: signalling the process group created for this child.
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("Command exited with status {code}"),
        None => "Command terminated by signal".to_string(),
    }
}
