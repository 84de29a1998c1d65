//! CLI command definitions, routing, and tracing setup.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use postcraft_analysis::{SourceText, analyze_source, format_markdown};
use postcraft_core::{ApplyOutcome, NewTemplate, TemplateService, validate};
use postcraft_shared::{AnalysisOptions, AppConfig, init_config, load_config, resolve_db_path};
use postcraft_storage::SqlRepository;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// postcraft: analyze source content and evolve blog templates from feedback.
#[derive(Parser)]
#[command(
    name = "postcraft",
    version,
    about = "Analyze source content and manage feedback-driven blog templates.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Template database path (overrides `[storage] db_path`).
    #[arg(long, global = true, env = "POSTCRAFT_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze text from a file (or stdin) and print the result as JSON.
    Analyze {
        /// Input file. Reads stdin when omitted.
        file: Option<PathBuf>,

        /// Title supplied by the upstream fetcher.
        #[arg(long)]
        title: Option<String>,

        /// Source URL supplied by the upstream fetcher.
        #[arg(long)]
        source_url: Option<String>,

        /// Maximum number of keywords.
        #[arg(long)]
        max_keywords: Option<usize>,

        /// Maximum section length in characters.
        #[arg(long)]
        max_section_length: Option<usize>,

        /// Print Markdown instead of the analysis JSON.
        #[arg(long)]
        markdown: bool,
    },

    /// Template management.
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Analyze feedback for a template; apply the proposals with --confirm.
    Feedback {
        /// Template ID.
        id: String,

        /// Free-text feedback.
        text: String,

        /// Apply the proposed changes and bump the template version.
        #[arg(long)]
        confirm: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Template subcommands.
#[derive(Subcommand)]
pub(crate) enum TemplateAction {
    /// List templates, most used first.
    List,
    /// Print a template record as JSON.
    Show { id: String },
    /// Create a template from a content file.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// File holding the template body.
        #[arg(long)]
        file: PathBuf,
        /// Explicit variable names (repeatable). Derived from content when omitted.
        #[arg(long = "variable")]
        variables: Vec<String>,
    },
    /// Render a template with `--var key=value` bindings.
    Render {
        id: String,
        #[arg(long = "var", value_parser = parse_binding)]
        vars: Vec<(String, String)>,
    },
    /// Check template content without storing it.
    Validate {
        #[arg(long)]
        file: PathBuf,
        /// Expected variable names (repeatable).
        #[arg(long = "variable")]
        variables: Vec<String>,
    },
    /// Record a 0-10 rating for a template.
    Score {
        id: String,
        #[arg(allow_negative_numbers = true)]
        score: f64,
    },
    /// Hide a template from use. Templates are never deleted.
    Deactivate { id: String },
    /// Re-enable a deactivated template.
    Activate { id: String },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

fn parse_binding(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty variable name in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "postcraft=info",
        1 => "postcraft=debug",
        _ => "postcraft=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so JSON on stdout stays machine-readable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let db = cli.db;
    match cli.command {
        Command::Analyze {
            file,
            title,
            source_url,
            max_keywords,
            max_section_length,
            markdown,
        } => {
            let mut opts = AnalysisOptions::from(&load_config()?);
            if let Some(n) = max_keywords {
                opts.max_keywords = n;
            }
            if let Some(n) = max_section_length {
                opts.max_section_length = n;
            }
            let source = SourceText {
                text: read_input(file.as_deref())?,
                title,
                source_url,
            };
            cmd_analyze(&source, &opts, markdown)
        }
        Command::Template { action } => cmd_template(db.as_deref(), action).await,
        Command::Feedback { id, text, confirm } => {
            let service = open_service(db.as_deref()).await?;
            cmd_feedback(&service, &id, &text, confirm).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

type Service = TemplateService<SqlRepository>;

async fn cmd_template(db: Option<&Path>, action: TemplateAction) -> Result<()> {
    match action {
        TemplateAction::List => cmd_template_list(&open_service(db).await?).await,
        TemplateAction::Show { id } => cmd_template_show(&open_service(db).await?, &id).await,
        TemplateAction::Create {
            name,
            description,
            file,
            variables,
        } => {
            let service = open_service(db).await?;
            cmd_template_create(&service, name, description, &file, variables).await
        }
        TemplateAction::Render { id, vars } => {
            let service = open_service(db).await?;
            cmd_template_render(&service, &id, vars.into_iter().collect()).await
        }
        TemplateAction::Validate { file, variables } => cmd_template_validate(&file, &variables),
        TemplateAction::Score { id, score } => {
            cmd_template_score(&open_service(db).await?, &id, score).await
        }
        TemplateAction::Deactivate { id } => {
            cmd_template_set_active(&open_service(db).await?, &id, false).await
        }
        TemplateAction::Activate { id } => {
            cmd_template_set_active(&open_service(db).await?, &id, true).await
        }
    }
}

/// Open the template store named by `--db` or the config file.
async fn open_service(db: Option<&Path>) -> Result<Service> {
    let config = load_config()?;
    let path = match db {
        Some(path) => path.to_path_buf(),
        None => resolve_db_path(&config.storage)?,
    };
    info!(path = %path.display(), "opening template store");

    let repo = SqlRepository::open(&path).await?;
    Ok(TemplateService::open(repo, config.templates.seed_defaults).await?)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_analyze(source: &SourceText, opts: &AnalysisOptions, markdown: bool) -> Result<()> {
    if markdown {
        println!("{}", format_markdown(&source.text, source.title.as_deref()));
        return Ok(());
    }
    let document = analyze_source(source, opts);
    print_json(&document)
}

async fn cmd_template_list(service: &Service) -> Result<()> {
    let summaries = service.list().await?;
    if summaries.is_empty() {
        println!("No templates.");
        return Ok(());
    }

    println!(
        "{:<16} {:<8} {:>6} {:>6}  {:<8} NAME",
        "ID", "VERSION", "USES", "SCORE", "STATUS"
    );
    for s in summaries {
        println!(
            "{:<16} {:<8} {:>6} {:>6.2}  {:<8} {}",
            s.id,
            s.version.to_string(),
            s.usage_count,
            s.feedback_score,
            if s.is_active { "active" } else { "inactive" },
            s.name
        );
    }
    Ok(())
}

async fn cmd_template_show(service: &Service, id: &str) -> Result<()> {
    let template = service.load(id).await?;
    print_json(&template)
}

async fn cmd_template_create(
    service: &Service,
    name: String,
    description: String,
    file: &Path,
    variables: Vec<String>,
) -> Result<()> {
    let content = read_input(Some(file))?;
    let template = service
        .create(NewTemplate {
            name,
            description,
            content,
            variables: (!variables.is_empty()).then_some(variables),
        })
        .await?;
    println!("Created template {} ({})", template.id, template.name);
    Ok(())
}

async fn cmd_template_render(
    service: &Service,
    id: &str,
    vars: HashMap<String, String>,
) -> Result<()> {
    let rendered = service.render(id, &vars).await?;
    println!("{rendered}");
    Ok(())
}

fn cmd_template_validate(file: &Path, variables: &[String]) -> Result<()> {
    let content = read_input(Some(file))?;
    let expected = (!variables.is_empty()).then_some(variables);
    let report = validate(&content, expected);
    print_json(&report)?;
    if !report.is_valid {
        return Err(eyre!("template is invalid: {}", report.issues.join("; ")));
    }
    Ok(())
}

async fn cmd_template_score(service: &Service, id: &str, score: f64) -> Result<()> {
    let updated = service.update_feedback_score(id, score).await?;
    println!("Feedback score for {id}: {updated:.2}");
    Ok(())
}

async fn cmd_template_set_active(service: &Service, id: &str, active: bool) -> Result<()> {
    let template = service.set_active(id, active).await?;
    let state = if template.is_active { "active" } else { "inactive" };
    println!("Template {id} is now {state}");
    Ok(())
}

async fn cmd_feedback(service: &Service, id: &str, text: &str, confirm: bool) -> Result<()> {
    if !confirm {
        let set = service.analyze_and_propose(id, text).await?;
        print_json(&set)?;
        if !set.proposals.is_empty() {
            eprintln!("Nothing was changed. Re-run with --confirm to apply these proposals.");
        }
        return Ok(());
    }

    match service.apply_confirmed(id, text, None).await? {
        ApplyOutcome::NoChange { .. } => println!("No changes proposed; template {id} unchanged."),
        ApplyOutcome::Applied {
            previous_version,
            new_version,
            entry,
        } => {
            println!("Template {id}: {previous_version} -> {new_version}");
            for patch in &entry.patches {
                println!("  - {patch}");
            }
        }
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
