#![allow(clippy::unused_async)]

use anyhow::Context;
use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;
mod ui;
mod write_lock;

use crate::cli::subcommands::{FindingCommands, PlanCommands, RiskCommands, WorkpaperCommands};
use crate::cli::{Commands, Verbosity};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("grc error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    init_tracing(flags.verbosity)?;
    ui::init(&flags);

    let cwd = std::env::current_dir().context("failed to read current directory")?;

    if let Commands::Init(args) = &cli.command {
        let root = cwd.join(&args.path);
        let config = bootstrap::load_config(&root)?;
        return commands::init::handle(&root, &config, &flags).await;
    }

    let project_root = context::resolve_project_root(flags.project.as_deref(), &cwd)?;
    let config = bootstrap::load_config(&project_root)?;

    let command = cli.command;
    let _lock = match write_scope(&command) {
        Some(scope) => Some(write_lock::acquire(&project_root, scope).await?),
        None => None,
    };

    let ctx = context::AppContext::init(project_root, config)
        .await
        .context("failed to open grc project")?;

    commands::dispatch::dispatch(command, &ctx, &flags).await
}

fn init_tracing(verbosity: Verbosity) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("GRC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.default_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing: {error}"))
}

/// Command group recorded in the write lock, or `None` for read-only commands.
fn write_scope(command: &Commands) -> Option<&'static str> {
    match command {
        Commands::Template { .. } | Commands::Audit(_) | Commands::Init(_) => None,
        Commands::Plan { action } => {
            (!matches!(action, PlanCommands::Get { .. } | PlanCommands::List { .. }))
                .then_some("plan")
        }
        Commands::Workpaper { action } => (!matches!(
            action,
            WorkpaperCommands::Get { .. } | WorkpaperCommands::List { .. }
        ))
        .then_some("workpaper"),
        Commands::Finding { action } => (!matches!(
            action,
            FindingCommands::Get { .. } | FindingCommands::List { .. }
        ))
        .then_some("finding"),
        Commands::Risk { action } => (!matches!(
            action,
            RiskCommands::Get { .. }
                | RiskCommands::List { .. }
                | RiskCommands::Heatmap
                | RiskCommands::KriList { .. }
        ))
        .then_some("risk"),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::write_scope;
    use crate::cli::Cli;

    fn scope(args: &[&str]) -> Option<&'static str> {
        let cli = Cli::try_parse_from(args).expect("cli should parse");
        write_scope(&cli.command)
    }

    #[test]
    fn reads_run_without_the_lock() {
        assert_eq!(scope(&["grc", "template", "list"]), None);
        assert_eq!(scope(&["grc", "plan", "list"]), None);
        assert_eq!(scope(&["grc", "finding", "get", "F-001"]), None);
        assert_eq!(scope(&["grc", "risk", "heatmap"]), None);
        assert_eq!(scope(&["grc", "risk", "kri-list", "rsk-1"]), None);
        assert_eq!(scope(&["grc", "audit"]), None);
    }

    #[test]
    fn mutations_are_scoped_by_command_group() {
        assert_eq!(scope(&["grc", "plan", "submit", "pln-1"]), Some("plan"));
        assert_eq!(
            scope(&[
                "grc", "workpaper", "tick", "wpp-1", "--code", "A", "--description", "Agreed"
            ]),
            Some("workpaper")
        );
        assert_eq!(
            scope(&["grc", "finding", "transition", "F-001", "closed"]),
            Some("finding")
        );
        assert_eq!(scope(&["grc", "risk", "kri-record", "kri-1", "12.5"]), Some("risk"));
    }
}
