//! icpwiz - Ideal Customer Profile wizard client

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cli::{backend_error, spinner, success_line, CliError};
use icpwiz_core::api::{ResourceKind, SuggestionKind};
use icpwiz_core::config::default_data_dir;
use icpwiz_core::storage::ScopedKey;
use icpwiz_core::validation::validate_invite;
use icpwiz_core::{
    access_basis, read_answers_file, validate_step, ApiClient, AuthClient, ClientConfig,
    FileStore, StorageService, SubmitOutcome, SubmitTarget, WizardStep, WizardSubmitter,
    WorkspaceLoader, WorkspaceSummary,
};
use icpwiz_types::{Collaborator, CollaboratorRole, User, Workspace};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "icpwiz",
    version,
    about = "Ideal Customer Profile wizard client",
    long_about = "Define a company's Ideal Customer Profile and manage the resulting workspaces.\n\
                  \n\
                  A workspace holds the company, its product, target account segments and the\n\
                  buyer personas inside each segment. Wizard answers are written as JSON or YAML\n\
                  files, validated step by step, then submitted to the backend.\n\
                  \n\
                  Examples:\n\
                    icpwiz login --email pat@acme.io       # Start a session\n\
                    icpwiz wizard validate answers.yaml    # Check every wizard step\n\
                    icpwiz wizard submit answers.yaml      # Create a workspace\n\
                    icpwiz workspaces                      # List workspaces\n\
                    icpwiz dashboard acme                  # Summary of one workspace\n\
                    icpwiz collaborators add acme sam@acme.io --role editor\n\
                  \n\
                  Environment Variables:\n\
                    VITE_API_URL                         # Backend origin (default http://localhost:5000)\n\
                    ICPWIZ_HOME                          # Data directory (local cache, config)\n\
                    ICPWIZ_PASSWORD                      # Password for signup/login\n\
                    RUST_LOG                             # Log filter (default warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend origin
    #[arg(long, global = true, env = "VITE_API_URL")]
    api_url: Option<String>,

    /// Directory holding the local cache and config
    #[arg(long, global = true, env = "ICPWIZ_HOME")]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "ICPWIZ_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and start a session
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ICPWIZ_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Start a session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ICPWIZ_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List workspaces
    Workspaces {
        /// Only show the local cache
        #[arg(long)]
        cached: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one workspace
    Show {
        slug: String,
        /// Bypass the local cache
        #[arg(long)]
        refresh: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a workspace (owner only)
    Delete { slug: String },
    /// Validate or submit wizard answers
    Wizard {
        #[command(subcommand)]
        action: WizardAction,
    },
    /// Target account segments of a workspace
    Segments {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Buyer personas of a workspace
    Personas {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Products of a workspace
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Workspace collaborators
    Collaborators {
        #[command(subcommand)]
        action: CollaboratorAction,
    },
    /// Show what you may do in a workspace
    Access {
        slug: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summary figures for a workspace
    Dashboard {
        slug: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the backend to draft entries (segments, personas, value-proposition)
    Suggest {
        slug: String,
        kind: SuggestionKind,
    },
    /// Local cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Client configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum WizardAction {
    /// Check an answers file step by step
    Validate {
        /// Answers file (.json, .yaml or .yml)
        file: PathBuf,
        /// Only check this step
        #[arg(long)]
        step: Option<StepArg>,
    },
    /// Validate, then create or update a workspace
    Submit {
        /// Answers file (.json, .yaml or .yml)
        file: PathBuf,
        /// Update this existing workspace instead of creating one
        #[arg(long)]
        workspace: Option<String>,
        /// Name of the new workspace (default: company name)
        #[arg(long, conflicts_with = "workspace")]
        name: Option<String>,
    },
    /// Print the answers kept from a submission that failed validation
    Draft {
        /// Workspace slug (or the slug of the name a new workspace would get)
        slug: String,
        /// Write the draft to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StepArg {
    Company,
    Product,
    Segments,
    Personas,
}

impl From<StepArg> for WizardStep {
    fn from(step: StepArg) -> Self {
        match step {
            StepArg::Company => WizardStep::Company,
            StepArg::Product => WizardStep::Product,
            StepArg::Segments => WizardStep::Segments,
            StepArg::Personas => WizardStep::Personas,
        }
    }
}

#[derive(Subcommand)]
enum ResourceAction {
    /// List entries
    List {
        slug: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one entry by id
    Delete { slug: String, id: String },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        slug: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CollaboratorAction {
    /// List collaborators
    List {
        slug: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Invite a collaborator
    Add {
        slug: String,
        email: String,
        #[arg(long, default_value = "viewer")]
        role: CollaboratorRole,
    },
    /// Revoke a collaborator's access
    Remove { slug: String, email: String },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop cached workspaces (the session is kept)
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Persist the backend origin
    SetApiUrl { url: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let no_color = cli.no_color;

    let outcome = tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!();
            eprintln!("{}", cli::failure_line("Interrupted", no_color));
            std::process::exit(130);
        }
    };

    if let Err(e) = outcome {
        cli::report_error(&e, no_color);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Everything a command needs: config, cache, backend client
struct App {
    data_dir: PathBuf,
    api: ApiClient,
    storage: StorageService<Arc<FileStore>>,
    no_color: bool,
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => Ok(default_data_dir()?),
    }
}

fn open_store(data_dir: &std::path::Path) -> Result<Arc<FileStore>> {
    let store = FileStore::open(data_dir)
        .with_context(|| format!("Failed to open local cache in {}", data_dir.display()))?;
    Ok(Arc::new(store))
}

impl App {
    fn open(data_dir: PathBuf, api_url: Option<String>, no_color: bool) -> Result<Self> {
        let config = ClientConfig::load(&data_dir).with_env().with_api_url(api_url);
        let store = open_store(&data_dir)?;
        let sessions = icpwiz_core::SessionStore::new(store.clone());
        let api = ApiClient::new(&config, sessions)?;

        Ok(Self {
            data_dir,
            api,
            storage: StorageService::new(store),
            no_color,
        })
    }

    fn loader(&self) -> WorkspaceLoader<'_, Arc<FileStore>> {
        WorkspaceLoader::new(&self.api, &self.storage)
    }

    fn user(&self) -> Result<User> {
        Ok(self.api.session().require_user()?)
    }

    fn done(&self, message: &str) {
        println!("{}", success_line(message, self.no_color));
    }

    /// Workspace plus the caller's rights, refusing when `allowed` says no
    async fn authorize(
        &self,
        slug: &str,
        action: &'static str,
        allowed: impl Fn(&icpwiz_core::AccessRights) -> bool,
    ) -> Result<Workspace> {
        let user = self.user()?;
        let workspace = self.loader().load(slug, false).await?;
        let collaborators = self.storage.get_collaborators(&workspace.id)?;
        let rights = access_basis(&workspace, Some(&user), &collaborators).rights();
        if !allowed(&rights) {
            return Err(CliError::PermissionDenied {
                action,
                slug: slug.to_string(),
            }
            .into());
        }
        Ok(workspace)
    }
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir)?;

    // Config commands must work even when the configured API URL is unusable
    let command = match cli.command {
        Command::Config { action } => {
            return run_config(&data_dir, cli.api_url, cli.no_color, action)
        }
        command => command,
    };
    let app = App::open(data_dir, cli.api_url, cli.no_color)?;

    match command {
        Command::Signup {
            name,
            email,
            password,
        } => run_signup(&app, &name, &email, &password).await,
        Command::Login { email, password } => run_login(&app, &email, &password).await,
        Command::Logout => {
            AuthClient::new(app.api.clone()).logout()?;
            app.done("Logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = app.user()?;
            println!("{} <{}>", user.display_name(), user.email);
            Ok(())
        }
        Command::Workspaces { cached, json } => run_workspaces(&app, cached, json).await,
        Command::Show {
            slug,
            refresh,
            json,
        } => run_show(&app, &slug, refresh, json).await,
        Command::Delete { slug } => run_delete(&app, &slug).await,
        Command::Wizard { action } => match action {
            WizardAction::Validate { file, step } => run_wizard_validate(&app, &file, step),
            WizardAction::Submit {
                file,
                workspace,
                name,
            } => run_wizard_submit(&app, &file, workspace, name).await,
            WizardAction::Draft { slug, output } => run_wizard_draft(&app, &slug, output),
        },
        Command::Segments { action } => run_resource(&app, ResourceKind::Segments, action).await,
        Command::Personas { action } => run_resource(&app, ResourceKind::Personas, action).await,
        Command::Products {
            action: ProductAction::List { slug, json },
        } => {
            app.user()?;
            let result = app.api.list_products(&slug).await;
            if !result.success {
                return Err(backend_error("List products", result).into());
            }
            let products = result.data.unwrap_or_default();
            println!("{}", cli::format_product_table(&products, json, app.no_color));
            Ok(())
        }
        Command::Collaborators { action } => run_collaborators(&app, action).await,
        Command::Access { slug, json } => run_access(&app, &slug, json).await,
        Command::Dashboard { slug, json } => run_dashboard(&app, &slug, json).await,
        Command::Suggest { slug, kind } => run_suggest(&app, &slug, kind).await,
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            app.storage.clear()?;
            app.done("Local cache cleared");
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}

async fn run_signup(app: &App, name: &str, email: &str, password: &str) -> Result<()> {
    let auth = AuthClient::new(app.api.clone());
    let result = auth.signup(name, email, password).await;
    if !result.success {
        return Err(backend_error("Sign up", result).into());
    }
    if let Some(session) = result.data {
        app.done(&format!("Account created for {}", session.user.email));
    }
    Ok(())
}

async fn run_login(app: &App, email: &str, password: &str) -> Result<()> {
    let auth = AuthClient::new(app.api.clone());
    let result = auth.login(email, password).await;
    if !result.success {
        return Err(backend_error("Log in", result).into());
    }
    if let Some(session) = result.data {
        app.done(&format!("Logged in as {}", session.user.display_name()));
    }
    Ok(())
}

async fn run_workspaces(app: &App, cached: bool, json: bool) -> Result<()> {
    let workspaces = if cached {
        app.storage.list_workspaces()?
    } else {
        app.user()?;
        let progress = spinner("Loading workspaces...");
        let fetched = app.loader().load_all().await;
        progress.finish_and_clear();

        match fetched {
            Ok(workspaces) => workspaces,
            Err(e) => {
                eprintln!("{}", cli::failure_line(&e.to_string(), app.no_color));
                eprintln!("  Showing cached workspaces");
                app.storage.list_workspaces()?
            }
        }
    };

    println!("{}", cli::format_workspace_table(&workspaces, json, app.no_color));
    Ok(())
}

async fn run_show(app: &App, slug: &str, refresh: bool, json: bool) -> Result<()> {
    let user = app.user()?;
    let workspace = app.loader().load(slug, refresh).await?;
    let collaborators = app.storage.get_collaborators(&workspace.id)?;
    let rights = access_basis(&workspace, Some(&user), &collaborators).rights();

    println!("{}", cli::format_workspace_info(&workspace, &rights, json));
    Ok(())
}

async fn run_delete(app: &App, slug: &str) -> Result<()> {
    let workspace = app
        .authorize(slug, "delete the workspace", |r| r.can_delete)
        .await?;

    let result = app.api.delete_workspace(slug).await;
    if !result.success {
        return Err(backend_error("Delete workspace", result).into());
    }
    app.storage.delete_workspace(&workspace.id)?;
    app.done(&format!("Deleted workspace '{}'", slug));
    Ok(())
}

fn run_wizard_validate(app: &App, file: &std::path::Path, step: Option<StepArg>) -> Result<()> {
    let (answers, notes) = read_answers_file(file)?;
    for note in &notes {
        eprintln!("  note: {}", note);
    }

    let steps: Vec<WizardStep> = match step {
        Some(step) => vec![step.into()],
        None => WizardStep::all()
            .into_iter()
            .filter(|s| s.is_data_step())
            .collect(),
    };
    let results: Vec<_> = steps
        .into_iter()
        .map(|step| (step, validate_step(step, &answers)))
        .collect();

    println!("{}", cli::format_validation(&results, app.no_color));

    let failed = results.iter().filter(|(_, r)| !r.is_valid).count();
    if failed > 0 {
        anyhow::bail!("{} step(s) incomplete", failed);
    }
    Ok(())
}

async fn run_wizard_submit(
    app: &App,
    file: &std::path::Path,
    workspace: Option<String>,
    name: Option<String>,
) -> Result<()> {
    app.user()?;
    let (answers, _) = read_answers_file(file)?;

    let target = match workspace {
        Some(slug) => SubmitTarget::Existing { slug },
        None => SubmitTarget::NewWorkspace {
            name: name.unwrap_or_else(|| answers.company.company_name.trim().to_string()),
        },
    };

    let submitter = WizardSubmitter::new(&app.api, &app.storage);
    let progress = spinner("Submitting answers...");
    let outcome = submitter.submit(&answers, &target).await;
    progress.finish_and_clear();

    match outcome? {
        SubmitOutcome::Invalid(failure) => {
            let results = vec![(
                failure.step,
                icpwiz_core::ValidationResult {
                    is_valid: false,
                    errors: failure.errors.clone(),
                },
            )];
            println!("{}", cli::format_validation(&results, app.no_color));
            eprintln!(
                "  Answers kept; see `icpwiz wizard draft {}`",
                target.draft_slug()
            );
            anyhow::bail!("{}", failure)
        }
        SubmitOutcome::Submitted(workspace) => {
            app.done(&format!(
                "Saved workspace '{}' ({})",
                workspace.name, workspace.slug
            ));
            let workspaces = app.storage.list_workspaces()?;
            println!("{}", cli::format_workspace_table(&workspaces, false, app.no_color));
            Ok(())
        }
    }
}

fn run_wizard_draft(app: &App, slug: &str, output: Option<PathBuf>) -> Result<()> {
    let Some(draft) = app
        .storage
        .get_scoped::<serde_json::Value>(ScopedKey::WizardDraft, slug)?
    else {
        anyhow::bail!("No wizard draft kept for '{}'", slug);
    };
    let text = serde_json::to_string_pretty(&draft)?;

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", text))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            app.done(&format!("Draft written to {}", path.display()));
        }
        None => println!("{}", text),
    }
    Ok(())
}

async fn run_resource(app: &App, kind: ResourceKind, action: ResourceAction) -> Result<()> {
    match action {
        ResourceAction::List { slug, json } => {
            app.user()?;
            let output = match kind {
                ResourceKind::Personas => {
                    let result = app.api.list_personas(&slug).await;
                    if !result.success {
                        return Err(backend_error("List personas", result).into());
                    }
                    cli::format_persona_table(&result.data.unwrap_or_default(), json, app.no_color)
                }
                _ => {
                    let result = app.api.list_segments(&slug).await;
                    if !result.success {
                        return Err(backend_error("List segments", result).into());
                    }
                    cli::format_segment_table(&result.data.unwrap_or_default(), json, app.no_color)
                }
            };
            println!("{}", output);
            Ok(())
        }
        ResourceAction::Delete { slug, id } => {
            let workspace = app
                .authorize(&slug, "delete entries", |r| r.can_edit)
                .await?;

            let result = app.api.delete_resource(&slug, kind, &id).await;
            if !result.success {
                return Err(backend_error(format!("Delete {}", kind), result).into());
            }
            match kind {
                ResourceKind::Personas => app.storage.evict_persona(&workspace.id, &id)?,
                _ => app.storage.evict_segment(&workspace.id, &id)?,
            }
            app.done(&format!("Deleted {} entry '{}'", kind, id));
            Ok(())
        }
    }
}

async fn run_collaborators(app: &App, action: CollaboratorAction) -> Result<()> {
    match action {
        CollaboratorAction::List { slug, json } => {
            app.user()?;
            let workspace = app.loader().load(&slug, false).await?;
            let collaborators = app.loader().collaborators(&workspace).await?;
            println!(
                "{}",
                cli::format_collaborator_table(&collaborators, json, app.no_color)
            );
            Ok(())
        }
        CollaboratorAction::Add { slug, email, role } => {
            let check = validate_invite(&email);
            if !check.is_valid {
                anyhow::bail!("{}", check.errors.join("; "));
            }
            let workspace = app
                .authorize(&slug, "invite collaborators", |r| r.can_invite)
                .await?;

            let result = app.api.invite_collaborator(&slug, email.trim(), role).await;
            if !result.success {
                return Err(backend_error("Invite collaborator", result).into());
            }
            let collaborator = result
                .data
                .unwrap_or_else(|| Collaborator::new(email.trim(), role));
            app.storage.add_collaborator(&workspace.id, collaborator)?;
            app.done(&format!("Invited {} as {}", email.trim(), role));
            Ok(())
        }
        CollaboratorAction::Remove { slug, email } => {
            let workspace = app
                .authorize(&slug, "remove collaborators", |r| r.can_invite)
                .await?;

            let result = app.api.remove_collaborator(&slug, &email).await;
            if !result.success {
                return Err(backend_error("Remove collaborator", result).into());
            }
            app.storage.remove_collaborator(&workspace.id, &email)?;
            app.done(&format!("Removed {}", email));
            Ok(())
        }
    }
}

async fn run_access(app: &App, slug: &str, json: bool) -> Result<()> {
    let user = app.api.session().current_user();
    let workspace = app.loader().load(slug, false).await?;
    let collaborators = app.storage.get_collaborators(&workspace.id)?;
    let basis = access_basis(&workspace, user.as_ref(), &collaborators);

    println!("{}", cli::format_access(basis, &basis.rights(), json));
    Ok(())
}

async fn run_dashboard(app: &App, slug: &str, json: bool) -> Result<()> {
    app.user()?;
    let workspace = app.loader().load(slug, false).await?;
    let answers = app.storage.get_icp_data(&workspace.id)?;
    let summary = WorkspaceSummary::build(&workspace, answers.as_ref());

    println!("{}", cli::format_summary(&summary, json));
    Ok(())
}

async fn run_suggest(app: &App, slug: &str, kind: SuggestionKind) -> Result<()> {
    app.user()?;
    let workspace = app.loader().load(slug, false).await?;
    let answers = app
        .storage
        .get_icp_data(&workspace.id)?
        .unwrap_or_default();

    let progress = spinner("Asking for suggestions...");
    let result = app.api.request_suggestions(slug, kind, &answers).await;
    progress.finish_and_clear();

    if !result.success {
        return Err(backend_error(format!("Suggest {}", kind), result).into());
    }
    let suggestions = result.data.unwrap_or_default();
    if suggestions.is_empty() {
        println!("No suggestions returned.");
    }
    for suggestion in suggestions {
        println!("  • {}", suggestion);
    }
    Ok(())
}

fn run_config(
    data_dir: &std::path::Path,
    api_url: Option<String>,
    no_color: bool,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = ClientConfig::load(data_dir).with_env().with_api_url(api_url);
            let sessions = icpwiz_core::SessionStore::new(open_store(data_dir)?);
            println!("API URL:          {}", config.api_url);
            if let Err(e) = config.clone().validated() {
                println!("                  ({})", e);
            }
            println!("Request timeout:  {}s", config.request_timeout_secs);
            println!("Data directory:   {}", data_dir.display());
            match sessions.current_user() {
                Some(user) => println!("Session:          {}", user.email),
                None => println!("Session:          not logged in"),
            }
            Ok(())
        }
        ConfigAction::SetApiUrl { url } => {
            let config = ClientConfig::load(data_dir)
                .with_api_url(Some(url))
                .validated()?;
            config.save(data_dir)?;
            println!(
                "{}",
                success_line(&format!("API URL set to {}", config.api_url), no_color)
            );
            Ok(())
        }
    }
}
