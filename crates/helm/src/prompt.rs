use helm_tui::Style;

use crate::project::ProjectContext;
use crate::tools::{RUN_COMMAND, WRITE_FILE};

/// System prompt for every turn: persona, working directory, markers, listing, tool guidance.
pub fn system_prompt(context: &ProjectContext) -> String {
    let markers = if context.markers.is_empty() {
        "none detected".to_string()
    } else {
        context
            .markers
            .iter()
            .map(|marker| format!("- {marker}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let listing = if context.listing.is_empty() {
        "(empty directory)"
    } else {
        context.listing.as_str()
    };

    format!(
        "You are helm, a concise assistant working in the user's terminal.\n\
         \n\
         Working directory: {root}\n\
         \n\
         Project markers:\n{markers}\n\
         \n\
         Directory listing:\n{listing}\n\
         \n\
         You can call `{RUN_COMMAND}` to run a shell command and `{WRITE_FILE}` to create or \
         overwrite a file. The user approves each call and may deny it; when a call is denied, \
         do not retry it unchanged. Prefer reading files with commands before editing them, \
         write complete file contents, and keep answers short.",
        root = context.root.display(),
    )
}

pub fn banner(style: &Style, model: &str, context: &ProjectContext) -> String {
    let mut lines = vec![
        style.bold(&format!("helm {}", env!("CARGO_PKG_VERSION"))),
        style.dim(&format!("model {model} · {}", context.root.display())),
    ];
    if !context.markers.is_empty() {
        let names: Vec<String> = context.markers.iter().map(ToString::to_string).collect();
        lines.push(style.dim(&names.join(" · ")));
    }
    lines.push(style.dim("Type / for commands, ``` for multi-line input, Ctrl+D to quit."));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::project::{MarkerKind, ProjectMarker};

    fn context() -> ProjectContext {
        ProjectContext {
            root: PathBuf::from("/work/app"),
            markers: vec![ProjectMarker {
                kind: MarkerKind::Rust,
                name: Some("app".to_string()),
                version: Some("0.3.0".to_string()),
            }],
            listing: "src/\n  main.rs".to_string(),
        }
    }

    #[test]
    fn system_prompt_carries_directory_markers_and_listing() {
        let prompt = system_prompt(&context());
        assert!(prompt.contains("Working directory: /work/app"));
        assert!(prompt.contains("- Rust (Cargo.toml): app 0.3.0"));
        assert!(prompt.contains("src/\n  main.rs"));
        assert!(prompt.contains("run_command"));
    }

    #[test]
    fn banner_names_the_model() {
        let banner = banner(&Style::plain(), "gpt-4o-mini", &context());
        assert!(banner.contains("model gpt-4o-mini"));
    }
}
