//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;

use skim::{ItemPreview, PreviewContext, SkimItem};

use crate::domain::{SavedTree, TreeId, TreeNode};
use crate::infrastructure::error::StoreResult;

/// Remote store of saved trees.
pub trait TreeStore: Send + Sync {
    /// All saved trees, oldest first.
    fn list_trees(&self) -> StoreResult<Vec<SavedTree>>;

    /// Persist a tree together with the text it was built from.
    fn save_tree(&self, input_numbers: &str, tree: Option<&TreeNode>) -> StoreResult<SavedTree>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Write string content to file, replacing it atomically.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Saved tree offered by a [`Selector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    pub id: TreeId,
    /// Display text shown in selector
    pub display: String,
    /// Summary shown in the preview pane
    pub preview: String,
}

/// Interactive FZF-style selector abstraction.
pub trait Selector: Send + Sync {
    /// Present items to user and return selected one.
    /// Returns None if user cancels (Esc/Ctrl-C).
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.ensure_parent(path)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Skim line for one offered item; `index` points back into the offered slice.
struct SkimEntry {
    index: usize,
    display: String,
    preview: String,
}

impl SkimItem for SkimEntry {
    fn text(&self) -> Cow<str> {
        Cow::Borrowed(&self.display)
    }

    fn preview(&self, _context: PreviewContext) -> ItemPreview {
        ItemPreview::Text(self.preview.clone())
    }
}

/// Real selector implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

impl Selector for SkimSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        use skim::prelude::*;
        use skim::AsAny;

        if items.is_empty() {
            return Ok(None);
        }

        let (tx, rx): (SkimItemSender, SkimItemReceiver) = unbounded();
        for (index, item) in items.iter().enumerate() {
            let entry = SkimEntry {
                index,
                display: item.display.clone(),
                preview: item.preview.clone(),
            };
            tx.send(Arc::new(entry))
                .map_err(|_| "selector input closed".to_string())?;
        }
        drop(tx);

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .preview(Some(""))
            .preview_window(Some("right:40%"))
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let output = match Skim::run_with(&options, Some(rx)) {
            Some(out) if !out.is_abort => out,
            _ => return Ok(None),
        };
        let chosen = output
            .selected_items
            .first()
            .and_then(|selected| (**selected).as_any().downcast_ref::<SkimEntry>())
            .and_then(|entry| items.get(entry.index))
            .cloned();
        Ok(chosen)
    }
}
