//! Collateral inventory and selection
//!
//! Tracks the ordered set of NFTs owned by the connected account plus the
//! transient single selection used for a pending borrow. The inventory is
//! replaced wholesale on every read cycle; there are no partial updates.

use crate::domain::primitives::TokenId;

/// Owned collateral assets with cursor and selection state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollateralInventory {
    assets: Vec<TokenId>,
    selected: Option<TokenId>,
    cursor: usize,
    loaded: bool,
}

impl CollateralInventory {
    /// Replaces the whole inventory with a freshly fetched id sequence
    ///
    /// The cursor is clamped into the new range. A selection pointing at an
    /// id the account no longer owns is cleared.
    pub fn replace_all(&mut self, assets: Vec<TokenId>) {
        if let Some(selected) = self.selected {
            if !assets.contains(&selected) {
                self.selected = None;
            }
        }
        self.cursor = self.cursor.min(assets.len().saturating_sub(1));
        self.assets = assets;
        self.loaded = true;
    }

    /// True once at least one fetch has completed
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn assets(&self) -> &[TokenId] {
        &self.assets
    }

    pub fn selected(&self) -> Option<TokenId> {
        self.selected
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor forward, wrapping at the end
    pub fn cursor_next(&mut self) {
        if !self.assets.is_empty() {
            self.cursor = (self.cursor + 1) % self.assets.len();
        }
    }

    /// Moves the cursor backward, wrapping at the start
    pub fn cursor_prev(&mut self) {
        if !self.assets.is_empty() {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.assets.len() - 1);
        }
    }

    /// Toggles selection of the asset under the cursor
    ///
    /// Selecting the already-selected asset clears the selection.
    pub fn toggle_at_cursor(&mut self) {
        let Some(&under_cursor) = self.assets.get(self.cursor) else {
            return;
        };
        self.selected = if self.selected == Some(under_cursor) {
            None
        } else {
            Some(under_cursor)
        };
    }
}
