//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::application::services::RenderOptions;
use crate::domain::TreeId;

/// Build binary search trees from number lists, lay them out and render them as SVG
#[derive(Parser, Debug)]
#[command(name = "bstview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory searched for a local .bstview.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Store base URL, overrides the configured one
    #[arg(long, global = true, value_hint = ValueHint::Url)]
    pub store_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree and print it
    Build {
        /// Comma-separated numbers, e.g. "10,5,15,3,7"
        #[arg(allow_hyphen_values = true)]
        numbers: String,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the laid out node positions
    Layout {
        /// Comma-separated numbers
        #[arg(allow_hyphen_values = true)]
        numbers: String,
    },

    /// Render a tree to SVG without saving it
    Render {
        /// Comma-separated numbers
        #[arg(allow_hyphen_values = true)]
        numbers: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Build a tree, save it to the store and render it
    Save {
        /// Comma-separated numbers
        #[arg(allow_hyphen_values = true)]
        numbers: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// List saved trees
    List,

    /// Render a saved tree
    Show {
        /// Saved tree id
        id: TreeId,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Choose a saved tree interactively and render it
    Pick {
        #[command(flatten)]
        render: RenderArgs,
    },

    /// Interactive session over the saved trees
    Session,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every command that writes a diagram.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct RenderArgs {
    /// SVG output file (default from config: tree.svg)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Click the node with this value before rendering
    #[arg(long, allow_hyphen_values = true)]
    pub select: Option<f64>,

    /// Hover the node with this value before rendering
    #[arg(long, allow_hyphen_values = true)]
    pub hover: Option<f64>,

    /// Zoom factor, clamped to the configured scale extent
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Pan by DX DY screen units
    #[arg(long, num_args = 2, value_names = ["DX", "DY"], allow_hyphen_values = true)]
    pub pan: Option<Vec<f64>>,
}

impl RenderArgs {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            select: self.select,
            hover: self.hover,
            zoom: self.zoom,
            pan: self.pan.as_deref().and_then(|p| match p {
                [dx, dy] => Some((*dx, *dy)),
                _ => None,
            }),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,

    /// Show config paths
    Path,
}
