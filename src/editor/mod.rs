//! Block editing core shared by every editing surface in the admin.
//!
//! One [`Editor`] type, configured with a [`Toolbar`], replaces per-page
//! editor variants. The rich-text surface itself lives outside this crate;
//! it reports user edits as HTML (`parse`) and loads HTML back
//! (`serialize`). External content goes through a [`SyncMachine`] so it
//! never lands on top of in-progress typing.

pub mod autosave;
pub mod dialog;
pub mod sync;
pub mod toolbar;

pub use autosave::Autosaver;
pub use dialog::BlockDialog;
pub use sync::{SyncMachine, SyncState};
pub use toolbar::{InlineFormat, Toolbar, ToolbarPreset};

use crate::error::AppError;
use crate::html::{parse_html, serialize_blocks};
use crate::model::ContentBlock;
use crate::types::BlockId;

/// The editing capability every surface exposes.
///
/// # Laws
///
/// - **L1 (Order)**: blocks keep their relative order; `insert_block` only
///   shifts later blocks.
/// - **L2 (Identity)**: `update_block` keeps the block's position and id.
/// - **L3 (Round trip)**: after `parse(&serialize())` text blocks keep their
///   count, types and text.
pub trait BlockEditor {
    fn blocks(&self) -> &[ContentBlock];

    /// Inserts at `index` (appends when `None` or past the end).
    fn insert_block(
        &mut self,
        index: Option<usize>,
        block: ContentBlock,
    ) -> Result<BlockId, AppError>;

    /// Replaces the block with the same id.
    fn update_block(&mut self, block: ContentBlock) -> Result<(), AppError>;

    /// HTML for the editing surface.
    fn serialize(&self) -> String;

    /// Takes the surface's HTML as the new document.
    fn parse(&mut self, html: &str) -> &[ContentBlock];
}

/// Outcome of handing external content to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalUpdate {
    Applied,
    /// Held until the user stops typing.
    Queued,
    /// Same as what is already loaded.
    Unchanged,
}

/// A document being edited with a given toolbar.
#[derive(Debug)]
pub struct Editor {
    toolbar: Toolbar,
    blocks: Vec<ContentBlock>,
    sync: SyncMachine<Vec<ContentBlock>>,
    dirty: bool,
}

impl Editor {
    pub fn new(toolbar: Toolbar) -> Self {
        Self {
            toolbar,
            blocks: Vec::new(),
            sync: SyncMachine::new(),
            dirty: false,
        }
    }

    pub fn with_content(toolbar: Toolbar, blocks: Vec<ContentBlock>) -> Self {
        Self {
            blocks,
            ..Self::new(toolbar)
        }
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    /// Whether the user changed the document since the last `mark_saved`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Builds a block from dialog input and inserts it.
    pub fn insert_from_dialog(
        &mut self,
        index: Option<usize>,
        dialog: BlockDialog,
    ) -> Result<BlockId, AppError> {
        self.ensure_allowed(dialog.kind())?;
        let block = dialog.into_block()?;
        self.insert_block(index, block)
    }

    pub fn remove_block(&mut self, id: &BlockId) -> Result<ContentBlock, AppError> {
        let index = self.position(id)?;
        self.touch();
        Ok(self.blocks.remove(index))
    }

    /// Moves a block to `to`, clamped to the document length.
    pub fn move_block(&mut self, id: &BlockId, to: usize) -> Result<(), AppError> {
        let from = self.position(id)?;
        let block = self.blocks.remove(from);
        let to = to.min(self.blocks.len());
        self.blocks.insert(to, block);
        self.touch();
        Ok(())
    }

    /// Content from outside the surface (reload, restored draft).
    pub fn receive_external(&mut self, blocks: Vec<ContentBlock>) -> ExternalUpdate {
        if blocks == self.blocks {
            return ExternalUpdate::Unchanged;
        }
        match self.sync.external(blocks) {
            Some(blocks) => {
                self.apply_external(blocks);
                ExternalUpdate::Applied
            }
            None => ExternalUpdate::Queued,
        }
    }

    /// The user stopped typing. Applies queued external content, if any.
    pub fn input_settled(&mut self) -> bool {
        match self.sync.settle() {
            Some(blocks) => {
                self.apply_external(blocks);
                true
            }
            None => false,
        }
    }

    fn apply_external(&mut self, blocks: Vec<ContentBlock>) {
        log::debug!("Applying {} externally supplied blocks", blocks.len());
        self.blocks = blocks;
        self.dirty = false;
        self.sync.finish_sync();
    }

    fn touch(&mut self) {
        self.sync.user_input();
        self.dirty = true;
    }

    fn ensure_allowed(&self, kind: crate::model::BlockType) -> Result<(), AppError> {
        if self.toolbar.allows(kind) {
            Ok(())
        } else {
            Err(AppError::Editor(format!(
                "{} blocks are not available in the {} editor",
                kind,
                self.toolbar.name()
            )))
        }
    }

    fn position(&self, id: &BlockId) -> Result<usize, AppError> {
        self.blocks
            .iter()
            .position(|b| &b.id == id)
            .ok_or_else(|| AppError::Editor(format!("no block with id {}", id)))
    }
}

impl BlockEditor for Editor {
    fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    fn insert_block(
        &mut self,
        index: Option<usize>,
        block: ContentBlock,
    ) -> Result<BlockId, AppError> {
        self.ensure_allowed(block.kind)?;
        if self.blocks.iter().any(|b| b.id == block.id) {
            return Err(AppError::Editor(format!("duplicate block id {}", block.id)));
        }
        let id = block.id.clone();
        let index = index.unwrap_or(self.blocks.len()).min(self.blocks.len());
        self.blocks.insert(index, block);
        self.touch();
        Ok(id)
    }

    fn update_block(&mut self, block: ContentBlock) -> Result<(), AppError> {
        self.ensure_allowed(block.kind)?;
        let index = self.position(&block.id)?;
        self.blocks[index] = block;
        self.touch();
        Ok(())
    }

    fn serialize(&self) -> String {
        serialize_blocks(&self.blocks)
    }

    fn parse(&mut self, html: &str) -> &[ContentBlock] {
        let parsed = parse_html(html);
        let disallowed = parsed
            .iter()
            .filter(|b| !self.toolbar.allows(b.kind))
            .count();
        if disallowed > 0 {
            // pasted content may carry blocks this toolbar cannot insert;
            // they are kept so nothing the user pasted is lost
            log::debug!(
                "{} parsed blocks are outside the {} toolbar",
                disallowed,
                self.toolbar.name()
            );
        }
        self.blocks = parsed;
        self.touch();
        &self.blocks
    }
}
