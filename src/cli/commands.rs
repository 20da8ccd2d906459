//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{GenerateOutcome, RenderService, TreeService};
use crate::cli::args::{Cli, Commands, ConfigCommands, RenderArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::session::Session;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    diagram, format_value, parse_numbers, to_json_string_pretty, SavedTree, TreeBuilder, TreeId,
    TreeNode, PLACEHOLDER,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::SelectionItem;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    match command {
        Commands::Completion { shell } => {
            completion(*shell);
            Ok(())
        }
        Commands::Config { command } => config_command(cli, command),
        _ => {
            let settings = load_settings(cli)?;
            let container = ServiceContainer::new(settings)?;
            dispatch(&container, command)
        }
    }
}

/// Run a tree command against already wired services.
pub fn dispatch(container: &ServiceContainer, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Build { numbers, json } => build(numbers, *json),
        Commands::Layout { numbers } => layout(container, numbers),
        Commands::Render { numbers, render } => render_numbers(container, numbers, render),
        Commands::Save { numbers, render } => save(container, numbers, render),
        Commands::List => list(container),
        Commands::Show { id, render } => show(container, *id, render),
        Commands::Pick { render } => pick(container, render),
        Commands::Session => session(container),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::Usage(
            "config and completion do not run against the store".into(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.project_dir.as_deref())?;
    if let Some(url) = &cli.store_url {
        settings.store.base_url = url.clone();
        settings.validate()?;
    }
    debug!(store = %settings.store.base_url, "settings loaded");
    Ok(settings)
}

/// Parse and build; blank input yields no tree.
fn build_tree(numbers: &str) -> CliResult<Option<TreeNode>> {
    if numbers.trim().is_empty() {
        return Ok(None);
    }
    let values = parse_numbers(numbers).map_err(crate::application::ApplicationError::from)?;
    Ok(TreeBuilder::build(&values))
}

#[instrument]
fn build(numbers: &str, json: bool) -> CliResult<()> {
    let tree = build_tree(numbers)?;
    if json {
        let text = to_json_string_pretty(&tree)
            .map_err(|e| CliError::InvalidArgs(format!("cannot encode tree: {e}")))?;
        output::info(&text);
        return Ok(());
    }
    match tree {
        Some(tree) => output::info(&output::tree_text(&tree)),
        None => output::info(PLACEHOLDER),
    }
    Ok(())
}

#[instrument(skip(container))]
fn layout(container: &ServiceContainer, numbers: &str) -> CliResult<()> {
    let Some(tree) = build_tree(numbers)? else {
        output::info(PLACEHOLDER);
        return Ok(());
    };
    let render = container.render_service();
    for pos in render.positions(&tree) {
        output::info(&format!(
            "{}\tdepth={}\tx={}\ty={}",
            format_value(pos.value),
            pos.depth,
            format_value(pos.x),
            format_value(pos.y)
        ));
    }
    Ok(())
}

fn write_diagram(
    render: &RenderService,
    tree: Option<&TreeNode>,
    args: &RenderArgs,
) -> CliResult<()> {
    let Some(tree) = tree else {
        output::info(PLACEHOLDER);
        return Ok(());
    };
    let diagram = render.prepare(tree, &args.options())?;
    let path = render.output_path(args.output.as_deref());
    render.write(&diagram, &path)?;
    output::action("Wrote", &format!("{} ({})", path.display(), diagram::describe(&diagram)));
    Ok(())
}

#[instrument(skip(container))]
fn render_numbers(container: &ServiceContainer, numbers: &str, args: &RenderArgs) -> CliResult<()> {
    let tree = build_tree(numbers)?;
    write_diagram(&container.render_service(), tree.as_ref(), args)
}

#[instrument(skip(container))]
fn save(container: &ServiceContainer, numbers: &str, args: &RenderArgs) -> CliResult<()> {
    let mut trees = container.tree_service();
    match trees.generate(numbers)? {
        GenerateOutcome::Empty => {
            output::info(PLACEHOLDER);
            Ok(())
        }
        GenerateOutcome::Saved(saved) => {
            output::success(&format!("Saved {}", saved.display_name()));
            write_diagram(&container.render_service(), saved.tree_structure.as_ref(), args)
        }
        GenerateOutcome::SaveFailed { message, .. } => Err(CliError::StoreUnavailable(message)),
    }
}

#[instrument(skip(container))]
fn list(container: &ServiceContainer) -> CliResult<()> {
    let mut trees = container.tree_service();
    let state = trees.load();
    if state.trees().is_empty() {
        output::info("No saved trees");
        return Ok(());
    }
    output::header("Recent");
    for tree in state.recent_trees() {
        output::detail(&tree.display_name());
    }
    if !state.older_trees().is_empty() {
        output::header("Older");
        for tree in state.older_trees() {
            output::detail(&tree.display_name());
        }
    }
    Ok(())
}

fn show_selected(
    container: &ServiceContainer,
    trees: &mut TreeService,
    id: TreeId,
    args: &RenderArgs,
) -> CliResult<()> {
    let saved = trees.select(id)?;
    debug!(id, input = %saved.input_numbers, "showing tree");
    write_diagram(&container.render_service(), trees.state().displayed_tree(), args)
}

#[instrument(skip(container))]
fn show(container: &ServiceContainer, id: TreeId, args: &RenderArgs) -> CliResult<()> {
    let mut trees = container.tree_service();
    trees.load();
    show_selected(container, &mut trees, id, args)
}

/// Selector entries for every saved tree, newest first.
pub(crate) fn selection_items(trees: &TreeService) -> Vec<SelectionItem> {
    trees
        .state()
        .trees()
        .iter()
        .rev()
        .map(|t| SelectionItem {
            id: t.id,
            display: t.display_name(),
            preview: preview(t),
        })
        .collect()
}

fn preview(saved: &SavedTree) -> String {
    match &saved.tree_structure {
        Some(root) => format!(
            "input: {}\nnodes: {}\nheight: {}\nroot: {}",
            saved.input_numbers,
            root.len(),
            root.height(),
            format_value(root.value)
        ),
        None => format!("input: {}\nempty tree", saved.input_numbers),
    }
}

#[instrument(skip(container))]
fn pick(container: &ServiceContainer, args: &RenderArgs) -> CliResult<()> {
    let mut trees = container.tree_service();
    trees.load();
    let items = selection_items(&trees);
    if items.is_empty() {
        output::info("No saved trees");
        return Ok(());
    }
    let chosen = container
        .selector
        .select_one(&items, "tree> ")
        .map_err(|message| InfraError::Selector { message })?;
    let Some(item) = chosen else {
        output::info("No tree selected");
        return Ok(());
    };
    show_selected(container, &mut trees, item.id, args)
}

fn session(container: &ServiceContainer) -> CliResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(container);
    session.run(stdin.lock(), &mut stdout.lock())
}

fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => print_config_path("Global", &path),
                None => output::action("Global", "unavailable (no home directory)"),
            }
            let dir = match &cli.project_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir()
                    .map_err(|e| InfraError::io("current directory", e))?,
            };
            print_config_path("Local", &local_config_path(&dir));
        }
    }
    Ok(())
}

fn print_config_path(label: &str, path: &Path) {
    let status = if path.exists() { "" } else { " (not found)" };
    output::action(label, &format!("{}{}", path.display(), status));
}

fn completion(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::traits::TreeStore;
    use crate::infrastructure::MemoryTreeStore;

    #[test]
    fn given_saved_trees_when_offering_selection_then_newest_first_with_summary() {
        let store = MemoryTreeStore::new();
        let tree = TreeBuilder::build(&[2.0, 1.0]);
        store.save_tree("2,1", tree.as_ref()).unwrap();
        store.save_tree("", None).unwrap();
        let mut trees = TreeService::new(Arc::new(store));
        trees.load();

        let items = selection_items(&trees);

        let ids: Vec<TreeId> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(items[0].preview, "input: \nempty tree");
        assert_eq!(items[1].display, "Tree 1: 2,1");
        assert_eq!(items[1].preview, "input: 2,1\nnodes: 2\nheight: 2\nroot: 2");
    }
}
