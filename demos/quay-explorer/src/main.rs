//! Discovers a Quay registry, prints the generated tool surface and
//! optionally invokes one tool.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use quay_mcp::client::{RegistryClient, ToolProvider};
use quay_mcp::config::{Settings, load_settings};
use quay_mcp::spec::SpecDocument;
use quay_mcp::telemetry::init_tracing;
use quay_mcp::tools::ToolDescriptor;
use serde_json::{Map, Value};
use tracing::info;

const PREVIEW_TOOLS: usize = 3;

#[derive(Debug, Parser)]
#[command(name = "quay-explorer", version, about)]
struct Cli {
    /// Registry base URL, e.g. https://quay.io.
    #[arg(long)]
    url: Option<String>,
    /// OAuth bearer token.
    #[arg(long)]
    token: Option<String>,
    /// Allowed operation tag; repeat to allow several.
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tool to invoke after discovery.
    #[arg(long)]
    call: Option<String>,
    /// Tool argument as key=value; repeatable.
    #[arg(long = "arg", value_parser = parse_argument, requires = "call")]
    arguments: Vec<(String, String)>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    apply_overrides(&mut settings, &cli);

    let level = cli.log_level.as_deref().or(settings.logging.level.as_deref());
    init_tracing(level)?;

    let config = settings
        .client_config()
        .context("a registry url is required (--url or [registry].url)")?;
    info!(registry = config.base_url(), "discovering registry");

    let mut client = RegistryClient::new(config)?;
    client.discover().await?;

    print_surface(&client);
    if let Some(spec) = client.spec() {
        print_spec(client.config().base_url(), spec);
    }

    if let Some(tool) = &cli.call {
        let arguments: Map<String, Value> = cli
            .arguments
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        let output = client.call_tool(tool, Value::Object(arguments)).await;
        println!("\n{}", output.text());
        if output.is_error() {
            bail!("tool `{tool}` failed");
        }
    }

    Ok(())
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(url) = &cli.url {
        settings.registry.url = Some(url.clone());
    }
    if let Some(token) = &cli.token {
        settings.registry.token = Some(token.clone());
    }
    if !cli.tags.is_empty() {
        settings.registry.allowed_tags = Some(cli.tags.clone());
    }
}

fn print_surface(client: &RegistryClient) {
    let tools = client.tools();
    println!("Registry: {}", client.config().base_url());
    println!("Resources: {}", client.resources().len());
    println!("Resource templates: {}", client.resource_templates().len());
    println!("Tools: {}", tools.len());

    for tool in tools.iter().take(PREVIEW_TOOLS) {
        print_tool(tool);
    }
    if tools.len() > PREVIEW_TOOLS {
        println!("... and {} more tools", tools.len() - PREVIEW_TOOLS);
    }
}

fn print_tool(tool: &ToolDescriptor) {
    println!("\n- {}: {}", tool.name(), tool.description());
    let schema = tool.input_schema();
    if !schema.required().is_empty() {
        println!("  Required parameters: {:?}", schema.required());
    }
    let optional: Vec<_> = schema.optional().collect();
    if !optional.is_empty() {
        println!("  Optional parameters: {optional:?}");
    }
}

fn print_spec(base_url: &str, spec: &SpecDocument) {
    println!("\nAPI description loaded from {base_url}");
    println!("Host: {}", spec.host.as_deref().unwrap_or("-"));
    println!("Base path: {}", spec.base_path().unwrap_or("-"));
    println!("Schemes: {:?}", spec.schemes);
    if let Some(info) = &spec.info {
        println!("API: {} {}", info.title, info.version);
        if let Some(description) = &info.description {
            println!("Description: {description}");
        }
    }
}

fn parse_argument(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("argument name is empty in `{raw}`"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
