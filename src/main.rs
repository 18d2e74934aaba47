use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tempo_auth::CredentialStore;
use tempo_calendar::CalendarClient;
use tempo_tools::ToolRegistry;

/// Line-based driver for the calendar tool set.
///
/// Intent parsing belongs to the language-model collaborator; this loop
/// dispatches explicit `<tool> <json-args>` invocations through the same
/// registry that collaborator would consume.
#[tokio::main]
async fn main() -> Result<()> {
    tempo_core::init()?;

    let settings = tempo_core::Settings::load()?;
    let validation = settings.validate();
    if !validation.is_valid() {
        anyhow::bail!("invalid settings: {}", validation.error_summary());
    }
    for warning in &validation.warnings {
        tracing::warn!("settings warning: {warning}");
    }

    let store = CredentialStore::new(
        settings.credentials_file.clone(),
        settings.token_file.clone(),
        tempo_auth::default_scopes(),
    );
    let client = Arc::new(CalendarClient::new(
        settings.calendar_id.clone(),
        settings.tz()?,
        store,
    ));
    let registry = ToolRegistry::with_defaults(client);

    tracing::info!("Tempo started (calendar: {})", settings.calendar_id);

    println!("Tempo - calendar tools ({})", settings.timezone);
    println!("Commands: tools | <tool> <json-args> | exit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }
        if line == "tools" {
            println!("{}", serde_json::to_string_pretty(&registry.specs())?);
            continue;
        }

        let (name, rest) = line.split_once(' ').unwrap_or((line, "{}"));
        let args: serde_json::Value = match serde_json::from_str(rest.trim()) {
            Ok(args) => args,
            Err(err) => {
                println!("invalid JSON arguments: {err}");
                continue;
            }
        };

        match registry.get(name) {
            Some(tool) => {
                let response = tool.invoke(args).await;
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            None => println!("unknown tool: {name} (try `tools`)"),
        }
    }

    Ok(())
}
