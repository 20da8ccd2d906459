//! Interactive session over the saved trees.
//!
//! Reads one command per line and keeps the selected tree's diagram alive
//! between commands, so hover, click and zoom accumulate until another tree
//! is selected.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::application::services::{GenerateOutcome, RenderService, TreeService};
use crate::cli::commands::selection_items;
use crate::cli::error::{CliError, CliResult};
use crate::domain::diagram::describe;
use crate::domain::{Diagram, SavedTree, TreeId, PLACEHOLDER};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::Selector;
use crate::infrastructure::InfraError;

const PROMPT: &str = "bst> ";

const HELP: &str = "\
gen <numbers>     build, save and select a tree
list              list saved trees
select [id]       select a saved tree, or clear the selection
pick              choose a saved tree interactively
hover <value>     hover a node
leave             end the hover
click <value>     select a node
zoom <k>          zoom about the centre
pan <dx> <dy>     pan in screen units
reset             reset zoom and pan
show              describe the current diagram
write [file]      write the current diagram as SVG
help              this text
quit              leave the session";

enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    trees: TreeService,
    render: RenderService,
    selector: Arc<dyn Selector>,
    diagram: Option<Diagram>,
    shown: Option<TreeId>,
}

impl Session {
    pub fn new(container: &ServiceContainer) -> Self {
        Self {
            trees: container.tree_service(),
            render: container.render_service(),
            selector: Arc::clone(&container.selector),
            diagram: None,
            shown: None,
        }
    }

    pub fn diagram(&self) -> Option<&Diagram> {
        self.diagram.as_ref()
    }

    pub fn trees(&self) -> &TreeService {
        &self.trees
    }

    /// Loads the saved trees, then executes commands until `quit` or end of input.
    ///
    /// Command failures are reported on `out` and the session continues.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> CliResult<()> {
        let count = self.trees.load().trees().len();
        say(out, format!("{count} saved trees, type 'help' for commands"))?;

        let mut lines = input.lines();
        loop {
            write!(out, "{PROMPT}").map_err(|e| InfraError::io("write prompt", e))?;
            out.flush().map_err(|e| InfraError::io("flush output", e))?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.map_err(|e| InfraError::io("read command", e))?;
            match self.execute(line.trim(), out) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(CliError::Infra(InfraError::Io { context, source })) => {
                    return Err(InfraError::Io { context, source }.into());
                }
                Err(e) => say(out, format!("error: {e}"))?,
            }
        }
        Ok(())
    }

    #[instrument(skip(self, out))]
    fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> CliResult<Flow> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "" => {}
            "gen" => self.generate(rest, out)?,
            "list" => self.list(out)?,
            "select" if rest.is_empty() => {
                self.trees.clear_selection();
                self.sync();
                say(out, PLACEHOLDER)?;
            }
            "select" => {
                let id = rest
                    .parse::<TreeId>()
                    .map_err(|_| CliError::InvalidArgs(format!("not a tree id: {rest}")))?;
                self.select(id, out)?;
            }
            "pick" => self.pick(out)?,
            "hover" => {
                let value = parse_value(rest)?;
                let diagram = self.diagram_mut()?;
                diagram.hover(value).map_err(ApplicationError::from)?;
                let text = diagram.interaction().hover_text(diagram.scene());
                say(out, text.unwrap_or_default())?;
            }
            "leave" => {
                self.diagram_mut()?.leave();
            }
            "click" => {
                let value = parse_value(rest)?;
                let diagram = self.diagram_mut()?;
                diagram.click(value).map_err(ApplicationError::from)?;
                let summary = describe(diagram);
                say(out, summary)?;
            }
            "zoom" => {
                let k = parse_value(rest)?;
                let viewport = self.diagram_mut()?.viewport_mut();
                viewport.zoom(k);
                let transform = viewport.transform().to_svg();
                say(out, transform)?;
            }
            "pan" => {
                let (dx, dy) = match rest.split_whitespace().collect::<Vec<_>>()[..] {
                    [dx, dy] => (parse_value(dx)?, parse_value(dy)?),
                    _ => return Err(CliError::Usage("pan <dx> <dy>".into())),
                };
                let viewport = self.diagram_mut()?.viewport_mut();
                viewport.pan(dx, dy);
                let transform = viewport.transform().to_svg();
                say(out, transform)?;
            }
            "reset" => {
                self.diagram_mut()?.viewport_mut().reset();
            }
            "show" => match &self.diagram {
                Some(diagram) => {
                    say(out, describe(diagram))?;
                    if let Some(text) = diagram.interaction().hover_text(diagram.scene()) {
                        say(out, text)?;
                    }
                }
                None => say(out, PLACEHOLDER)?,
            },
            "write" => {
                let diagram = self.diagram.as_ref().ok_or_else(no_diagram)?;
                let explicit = (!rest.is_empty()).then(|| PathBuf::from(rest));
                let path = self.render.output_path(explicit.as_deref());
                self.render.write(diagram, &path)?;
                say(out, format!("wrote {}", path.display()))?;
            }
            "help" => say(out, HELP)?,
            "quit" | "exit" => return Ok(Flow::Quit),
            other => return Err(CliError::Usage(format!("unknown command '{other}', try 'help'"))),
        }
        Ok(Flow::Continue)
    }

    fn generate<W: Write>(&mut self, numbers: &str, out: &mut W) -> CliResult<()> {
        match self.trees.generate(numbers)? {
            GenerateOutcome::Empty => say(out, PLACEHOLDER)?,
            GenerateOutcome::Saved(saved) => {
                self.sync();
                say(out, format!("saved {}", saved.display_name()))?;
            }
            GenerateOutcome::SaveFailed { message, .. } => {
                say(out, format!("save failed, nothing selected: {message}"))?;
            }
        }
        Ok(())
    }

    fn list<W: Write>(&mut self, out: &mut W) -> CliResult<()> {
        let state = self.trees.load();
        let selected = state.selected_id();
        let entries = |trees: &[SavedTree]| {
            trees
                .iter()
                .map(|t| {
                    let mark = if Some(t.id) == selected { '*' } else { ' ' };
                    format!(" {mark} {}", t.display_name())
                })
                .join("\n")
        };
        let text = match (state.recent_trees(), state.older_trees()) {
            ([], _) => "no saved trees".to_string(),
            (recent, []) => format!("Recent:\n{}", entries(recent)),
            (recent, older) => format!("Recent:\n{}\nOlder:\n{}", entries(recent), entries(older)),
        };
        self.sync();
        say(out, text)
    }

    fn select<W: Write>(&mut self, id: TreeId, out: &mut W) -> CliResult<()> {
        let result = self.trees.select(id).map(|t| t.display_name());
        self.sync();
        let name = result?;
        say(out, format!("showing {name}"))
    }

    fn pick<W: Write>(&mut self, out: &mut W) -> CliResult<()> {
        let items = selection_items(&self.trees);
        let chosen = self
            .selector
            .select_one(&items, "tree> ")
            .map_err(|message| InfraError::Selector { message })?;
        match chosen {
            Some(item) => self.select(item.id, out),
            None => say(out, "no tree selected"),
        }
    }

    /// Rebuild the diagram when the selected tree changed.
    fn sync(&mut self) {
        let selected = self.trees.state().selected_id();
        if selected == self.shown {
            return;
        }
        debug!(?selected, "selected tree changed, rebuilding diagram");
        self.diagram = self
            .trees
            .state()
            .displayed_tree()
            .map(|tree| self.render.diagram(tree));
        self.shown = selected;
    }

    fn diagram_mut(&mut self) -> CliResult<&mut Diagram> {
        self.diagram.as_mut().ok_or_else(no_diagram)
    }
}

fn no_diagram() -> CliError {
    CliError::Usage(PLACEHOLDER.into())
}

fn parse_value(text: &str) -> CliResult<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CliError::InvalidArgs(format!("not a number: '{text}'")))
}

fn say<W: Write>(out: &mut W, text: impl std::fmt::Display) -> CliResult<()> {
    writeln!(out, "{text}").map_err(|e| InfraError::io("write output", e).into())
}
