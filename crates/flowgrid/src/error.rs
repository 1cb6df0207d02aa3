#![forbid(unsafe_code)]

//! Errors surfaced by grid operations.
//!
//! Every operation validates its arguments before mutating anything, so an
//! `Err` always means the grid is exactly as it was before the call.

use std::fmt;

use crate::item::ItemId;

/// Coarse classification of a [`GridError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operation on a destroyed grid/item, or a drag on a hidden item.
    InvalidState,
    /// Reference to an item this grid does not know, or a config that
    /// fails validation.
    InvalidArgument,
    /// A second drag session on an item that is already being dragged.
    ConcurrentDragConflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    GridDestroyed,
    ItemDestroyed { item: ItemId },
    ItemHidden { item: ItemId },
    UnknownItem { item: ItemId },
    DragConflict { item: ItemId },
    /// Messages from [`GridConfig::validate`](crate::GridConfig::validate).
    InvalidConfig { errors: Vec<String> },
}

impl GridError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::GridDestroyed | Self::ItemDestroyed { .. } | Self::ItemHidden { .. } => {
                ErrorKind::InvalidState
            }
            Self::UnknownItem { .. } | Self::InvalidConfig { .. } => ErrorKind::InvalidArgument,
            Self::DragConflict { .. } => ErrorKind::ConcurrentDragConflict,
        }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridDestroyed => write!(f, "grid has been destroyed"),
            Self::ItemDestroyed { item } => write!(f, "{item} has been destroyed"),
            Self::ItemHidden { item } => write!(f, "{item} is hidden and cannot be dragged"),
            Self::UnknownItem { item } => write!(f, "{item} does not belong to this grid"),
            Self::DragConflict { item } => write!(f, "{item} is already being dragged"),
            Self::InvalidConfig { errors } => write!(f, "invalid config: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for GridError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_error_taxonomy() {
        let item = ItemId::from_raw(7);
        assert_eq!(GridError::GridDestroyed.kind(), ErrorKind::InvalidState);
        assert_eq!(GridError::ItemHidden { item }.kind(), ErrorKind::InvalidState);
        assert_eq!(GridError::UnknownItem { item }.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            GridError::InvalidConfig { errors: Vec::new() }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            GridError::DragConflict { item }.kind(),
            ErrorKind::ConcurrentDragConflict
        );
    }

    #[test]
    fn display_names_the_item() {
        let err = GridError::ItemDestroyed {
            item: ItemId::from_raw(3),
        };
        assert_eq!(err.to_string(), "item#3 has been destroyed");
    }
}
