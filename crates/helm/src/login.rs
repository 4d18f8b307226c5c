use anyhow::{bail, Context};
use helm_tui::{prompt_text_with, EnvConfig, Style, Terminal, TextPrompt};

use crate::config::{
    ConfigLayers, HelmPaths, API_KEY_VAR, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL, MODEL_VAR,
};
use crate::console::print_line;
use crate::settings;

/// First-time setup. Returns `false` when the user cancelled or gave no key.
pub fn run_login(
    terminal: &mut dyn Terminal,
    style: &Style,
    ui: &EnvConfig,
    paths: &HelmPaths,
    layers: &ConfigLayers,
) -> anyhow::Result<bool> {
    if !terminal.is_interactive() {
        bail!("helm login needs an interactive terminal");
    }
    let settings_file = paths.settings_file();

    let key_prompt = TextPrompt::new("API key")
        .with_subtitle(format!("Saved to {}", settings_file.display()))
        .with_placeholder("required");
    let Some(api_key) = prompt_text_with(terminal, &key_prompt, ui)? else {
        print_line(terminal, &style.dim("Login cancelled."));
        return Ok(false);
    };
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        print_line(terminal, &style.red("An API key is required."));
        return Ok(false);
    }

    let current_base_url = layers
        .lookup(BASE_URL_VAR)
        .map(|value| value.value)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_prompt = TextPrompt::new("Base URL")
        .with_subtitle("Leave empty to keep the current value")
        .with_placeholder(current_base_url);
    let Some(base_url) = prompt_text_with(terminal, &base_prompt, ui)? else {
        print_line(terminal, &style.dim("Login cancelled."));
        return Ok(false);
    };

    let current_model = layers
        .lookup(MODEL_VAR)
        .map(|value| value.value)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let model_prompt = TextPrompt::new("Model")
        .with_subtitle("Leave empty to keep the current value")
        .with_placeholder(current_model);
    let Some(model) = prompt_text_with(terminal, &model_prompt, ui)? else {
        print_line(terminal, &style.dim("Login cancelled."));
        return Ok(false);
    };

    let write = |key: &str, value: &str| {
        settings::set_value(&settings_file, key, value)
            .with_context(|| format!("failed to save {key} to {}", settings_file.display()))
    };
    write(API_KEY_VAR, &api_key)?;
    for (key, value) in [(BASE_URL_VAR, base_url), (MODEL_VAR, model)] {
        let value = value.trim();
        if !value.is_empty() {
            write(key, value)?;
        }
    }

    print_line(
        terminal,
        &style.green(&format!("Saved settings to {}", settings_file.display())),
    );
    Ok(true)
}
