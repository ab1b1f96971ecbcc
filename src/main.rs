//! Stdio entrypoint: one JSON tool call per line on stdin, one JSON envelope
//! per line on stdout. Logs go to stderr so stdout stays protocol-clean.

// std
use std::{env, sync::Arc};
// crates.io
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;
// self
use ynab_mcp::{
	config::Config,
	error::Error,
	mcp::{Dispatcher, error_envelope, schema},
	ops::Services,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();

	let config = match env::args().nth(1).or_else(|| env::var("YNAB_MCP_CONFIG").ok()) {
		Some(path) => Config::load(&path)?,
		None => Config::default(),
	};
	let services = Arc::new(Services::from_config(&config)?);
	let _sweeper = services.quota.spawn_sweeper();
	let dispatcher = Dispatcher::new(services);
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut stdout = tokio::io::stdout();

	tracing::info!("listening on stdio");

	while let Some(line) = lines.next_line().await? {
		let line = line.trim();

		if line.is_empty() {
			continue;
		}

		// `Value`'s `Display` renders compact single-line JSON.
		let mut payload = respond(&dispatcher, line).await.to_string();

		payload.push('\n');
		stdout.write_all(payload.as_bytes()).await?;
		stdout.flush().await?;
	}

	Ok(())
}

async fn respond(dispatcher: &Dispatcher, line: &str) -> Value {
	let request: Value = match serde_json::from_str(line) {
		Ok(value) => value,
		Err(err) => return error_envelope(&Error::validation(format!("Invalid request: {err}"))),
	};
	let Some(function) = request["function"].as_str() else {
		return error_envelope(&Error::validation("Function name is required"));
	};

	if function == "list_tools" {
		return json!({ "status": "success", "result": schema::tool_definitions() });
	}

	let params = request.get("parameters").cloned().unwrap_or_else(|| json!({}));

	dispatcher.handle(function, params).await
}
