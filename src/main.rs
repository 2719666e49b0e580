// promptgen: tier-aware prompt template catalog and generation CLI
// Copyright (c) 2025 Promptgen Core Team

use clap::Parser;
use colored::Colorize;
use promptgen::{
    ai::{prompt, GeminiProvider, GenerationRequest, LlmProvider},
    config::{read_file_content, Config},
    error::{Error, Result},
    template::{resolve, CatalogEngine, CatalogLoader, SourceLoader, TemplateCatalog, Tier},
};
use std::collections::HashMap;
use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands, ConfigAction, ListFormat, TemplateAction};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_logging(&cli);

    if let Err(e) = run(cli).await {
        tracing::error!("Error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize logging based on verbosity level
/// - 0: errors only
/// - 1 (-v): info
/// - 2 (-vv): debug
/// - 3+ (-vvv): trace
fn init_logging(cli: &Cli) {
    let filter_str = match cli.verbose {
        0 => "error",
        1 => "promptgen=info,pgen=info",
        2 => "promptgen=debug,pgen=debug",
        _ => "promptgen=trace,pgen=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI command
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => run_generate(args, config).await,
        Commands::Template(cmd) => run_template_command(cmd.action, &config),
        Commands::Config(cmd) => run_config_command(cmd.action, &config),
    }
}

/// Build the template catalog from the effective configuration
fn build_catalog(config: &Config) -> Arc<TemplateCatalog> {
    Arc::new(TemplateCatalog::build(
        &config.templates.tier_roots(),
        config.templates.extension_set(),
    ))
}

async fn run_generate(args: cli::GenerateArgs, mut config: Config) -> Result<()> {
    // CLI flags override the merged file configuration
    if let Some(model) = args.model {
        config.generation.model = model;
    }
    if let Some(temperature) = args.temperature {
        config.generation.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_output_tokens {
        config.generation.max_output_tokens = Some(max_tokens);
    }
    if let Some(name) = args.system_template {
        config.generation.system_instruction_template = Some(name);
    }
    if let Some(name) = args.user_template {
        config.generation.user_instruction_template = Some(name);
    }

    let mut vars = parse_vars(&args.vars)?;
    let document = read_document(args.document.as_deref())?;
    vars.entry("document".to_string()).or_insert(document);
    if let Some(input) = args.input {
        vars.insert("input".to_string(), input);
    }

    let catalog = build_catalog(&config);
    let engine = CatalogEngine::new(catalog);

    let system = prompt::render_system_instruction(&config.generation, &engine, &vars)?;
    let user =
        prompt::render_user_instruction(&config.generation, &engine, &vars)?.unwrap_or_default();

    if args.show_prompt {
        if let Some(system) = &system {
            println!("{}", "--- system instruction ---".bold());
            println!("{}", system);
        }
        println!("{}", "--- user instruction ---".bold());
        println!("{}", user);
        return Ok(());
    }

    let provider = GeminiProvider::from_env(config.generation.model.clone());
    if !provider.is_available() {
        return Err(Error::Generation(
            "no API key configured; set GEMINI_API_KEY".to_string(),
        ));
    }

    let request = GenerationRequest {
        system_instruction: system,
        user_prompt: user,
        temperature: Some(config.generation.temperature),
        max_output_tokens: config.generation.max_output_tokens,
        response_mime_type: Some(config.generation.response_mime_type.clone()),
        ..GenerationRequest::default()
    };

    let text = provider
        .generate(&request)
        .await
        .map_err(|e| Error::Generation(e.to_string()))?;

    println!("{}", text);
    Ok(())
}

fn run_template_command(action: TemplateAction, config: &Config) -> Result<()> {
    let catalog = build_catalog(config);

    match action {
        TemplateAction::List { tier, format } => {
            let tier: Option<Tier> = tier.map(Into::into);
            let records: Vec<_> = catalog
                .iter()
                .filter(|r| tier.map_or(true, |t| r.tier == t))
                .collect();

            match format {
                ListFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&records).map_err(
                        |e| Error::config(format!("cannot serialize listing: {e}")),
                    )?);
                }
                ListFormat::Text => {
                    if records.is_empty() {
                        println!("No templates found.");
                        println!(
                            "Searched roots: {}",
                            catalog
                                .searched_roots()
                                .iter()
                                .map(|r| r.display().to_string())
                                .collect::<Vec<_>>()
                                .join(", ")
                        );
                        return Ok(());
                    }
                    for record in records {
                        let tier_cell = format!("{:<8}", record.tier);
                        let tier_cell = match record.tier {
                            Tier::Project => tier_cell.green(),
                            Tier::User => tier_cell.cyan(),
                            Tier::Builtin => tier_cell.normal(),
                        };
                        println!(
                            "{} {:<32} {}",
                            tier_cell,
                            record.logical_name,
                            record.relative_path.display()
                        );
                    }
                }
            }
        }

        TemplateAction::Show { name } => {
            let record = resolve(&catalog, &name)?;
            println!("{:<10} {}", "name:".bold(), record.logical_name);
            println!("{:<10} {}", "tier:".bold(), record.tier);
            println!("{:<10} {}", "root:".bold(), record.root_index);
            println!("{:<10} {}", "path:".bold(), record.absolute_path.display());
            println!();

            let loader = CatalogLoader::new(Arc::clone(&catalog));
            let source = loader.get_source(&name)?;
            print!("{}", source.source());
        }

        TemplateAction::Render { name, vars } => {
            let vars = parse_vars(&vars)?;
            let engine = CatalogEngine::new(catalog);
            let rendered = engine.render(&name, &vars)?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn run_config_command(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::View => {
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| Error::config(format!("cannot serialize configuration: {e}")))?;
            print!("{}", rendered);
        }
        ConfigAction::Defaults => {
            let rendered = toml::to_string_pretty(&Config::default())
                .map_err(|e| Error::config(format!("cannot serialize configuration: {e}")))?;
            print!("{}", rendered);
        }
        ConfigAction::Path => {
            match Config::user_config_path() {
                Some(path) => println!("user:       {} ({})", path.display(), existence(&path)),
                None => println!("user:       <no config directory on this platform>"),
            }
            match Config::repo_config_path() {
                Some(path) => println!("repository: {} ({})", path.display(), existence(&path)),
                None => println!("repository: <not inside a git repository>"),
            }
        }
    }
    Ok(())
}

fn existence(path: &Path) -> &'static str {
    if path.exists() {
        "exists"
    } else {
        "not found"
    }
}

/// Parse repeated KEY=VALUE pairs into a variable map
fn parse_vars(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::Usage(format!(
                "invalid --var '{}': expected KEY=VALUE",
                pair
            )));
        };
        if key.is_empty() {
            return Err(Error::Usage(format!(
                "invalid --var '{}': empty variable name",
                pair
            )));
        }
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}

/// Read the document either from a file or from piped stdin; an interactive
/// terminal yields an empty document rather than blocking
fn read_document(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        return read_file_content(path);
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    let mut document = String::new();
    stdin.read_to_string(&mut document)?;
    Ok(document)
}
