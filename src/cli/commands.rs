//! Command dispatch
//!
//! Each command loads the taxonomy through the service container, runs one
//! domain operation and prints the result.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::SourceFormat;
use crate::cli::args::{Cli, Commands, ConfigCommands, ExportKind, SourceArgs};
use crate::cli::output;
use crate::cli::render::TaxonomyConvert;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{ItemId, Taxonomy};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see --help".to_string()));
    };

    // completion and config do not need a taxonomy
    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        Commands::Config { command } => return config_cmd(cli, command),
        _ => {}
    }

    let container = ServiceContainer::new(load_settings(cli)?);
    match command {
        Commands::Tree { source, id } => tree(&container, source, *id),
        Commands::Summary { source } => summary(&container, source),
        Commands::Levels { source, level } => levels(&container, source, *level),
        Commands::Search { source, name, id } => search(&container, source, name, id),
        Commands::Similar { source, id } => similar(&container, source, id),
        Commands::Export { source, to, output } => export(&container, source, *to, output),
        Commands::Remove { source, id, output } => remove(&container, source, id, output),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("resolve current directory", e))),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = project_dir(cli)?;
    Ok(Settings::load(Some(&dir))?)
}

fn load(container: &ServiceContainer, source: &SourceArgs) -> CliResult<Taxonomy> {
    let format = source
        .format
        .as_deref()
        .map(str::parse::<SourceFormat>)
        .transpose()?;
    Ok(container.taxonomy_service.load(&source.file, format)?)
}

fn to_ids(raw: &[i64]) -> Vec<ItemId> {
    raw.iter().copied().map(ItemId).collect()
}

#[instrument(skip(container))]
fn tree(container: &ServiceContainer, source: &SourceArgs, id: Option<i64>) -> CliResult<()> {
    let mut taxonomy = load(container, source)?;
    let start = match id {
        Some(id) => taxonomy.find(ItemId(id))?,
        None => taxonomy.require_root()?,
    };
    let drawing = taxonomy.to_tree_string(start, container.settings.display.precision)?;
    output::info(&drawing);
    Ok(())
}

#[instrument(skip(container))]
fn summary(container: &ServiceContainer, source: &SourceArgs) -> CliResult<()> {
    let mut taxonomy = load(container, source)?;
    output::info(&taxonomy.summary()?);
    Ok(())
}

#[instrument(skip(container))]
fn levels(container: &ServiceContainer, source: &SourceArgs, level: Option<usize>) -> CliResult<()> {
    let mut taxonomy = load(container, source)?;
    let precision = container.settings.display.precision;

    if let Some(level) = level {
        for (name, score) in taxonomy.level_scores(level)? {
            output::detail(&format!("{}: {:.*}", name, precision, score));
        }
        return Ok(());
    }

    for (n, group) in taxonomy.items_by_level()?.iter().enumerate() {
        output::header(&format!("Level {} ({} items)", n, group.len()));
        let names = group
            .iter()
            .filter_map(|&idx| taxonomy.name_of(idx))
            .join(", ");
        output::detail(&names);
    }
    Ok(())
}

#[instrument(skip(container))]
fn search(
    container: &ServiceContainer,
    source: &SourceArgs,
    names: &[String],
    ids: &[i64],
) -> CliResult<()> {
    let taxonomy = load(container, source)?;

    if !ids.is_empty() {
        for idx in taxonomy.search_by_id(&to_ids(ids))? {
            if let Some(record) = taxonomy.to_record(idx) {
                output::info(&record);
                output::info("");
            }
        }
        return Ok(());
    }

    let terms: Vec<&str> = names.iter().map(String::as_str).collect();
    let groups = taxonomy.search_by_name(&terms)?;
    for (term, group) in terms.iter().zip(groups) {
        output::header(&format!("{} ({} matches)", term, group.len()));
        for idx in group {
            if let (Some(id), Some(name)) = (taxonomy.id_of(idx), taxonomy.name_of(idx)) {
                output::detail(&format!("{:>5}  {}", id, name));
            }
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn similar(container: &ServiceContainer, source: &SourceArgs, ids: &[i64]) -> CliResult<()> {
    let taxonomy = load(container, source)?;
    let groups = taxonomy.similar_items_by_id(&to_ids(ids))?;
    debug!("{} sibling groups", groups.len());

    for group in groups {
        let parent = group
            .first()
            .and_then(|&idx| taxonomy.get(idx))
            .and_then(|item| item.parent())
            .and_then(|p| taxonomy.name_of(p))
            .unwrap_or("-");
        output::header(parent);
        for idx in group {
            if let Some(name) = taxonomy.name_of(idx) {
                output::detail(name);
            }
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn export(
    container: &ServiceContainer,
    source: &SourceArgs,
    kind: ExportKind,
    path: &Path,
) -> CliResult<()> {
    let taxonomy = load(container, source)?;
    let service = &container.taxonomy_service;
    match kind {
        ExportKind::Csv => {
            service.export_records(&taxonomy, path, SourceFormat::Tabular)?;
        }
        ExportKind::Json => {
            service.export_records(&taxonomy, path, SourceFormat::Records)?;
        }
        ExportKind::Nested => service.export_nested(&taxonomy, path)?,
    }
    output::action("Exported", &path.display());
    Ok(())
}

#[instrument(skip(container))]
fn remove(container: &ServiceContainer, source: &SourceArgs, ids: &[i64], path: &Path) -> CliResult<()> {
    let format = SourceFormat::from_path(path)?;
    let mut taxonomy = load(container, source)?;

    let removed = taxonomy.remove_by_id(&to_ids(ids))?;
    let remaining = container
        .taxonomy_service
        .export_records(&taxonomy, path, format)?;
    output::success(&format!(
        "removed {} items, {} written to {}",
        removed,
        remaining,
        path.display()
    ));
    Ok(())
}

fn config_cmd(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let dir = project_dir(cli)?;
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            output::action("global", &global);
            output::action("local", &local_config_path(&dir).display());
        }
    }
    Ok(())
}
