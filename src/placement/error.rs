use std::fmt;

use bevy::prelude::*;

use crate::grid::{GridError, HexCoord, StructureType};

/// Why a placement operation did not happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementError {
    /// The target cell is outside the grid.
    CellOutOfBounds(HexCoord),
    /// Every pooled object is in use.
    PoolExhausted,
    /// The level already holds something and adding to occupied cells is off.
    LevelOccupied {
        /// Target cell.
        cell: HexCoord,
        /// Whole level that is occupied.
        level: u32,
    },
    /// The structure would break the level's slot exclusivity.
    StructureConflict {
        /// Target cell.
        cell: HexCoord,
        /// Whole level that was checked.
        level: u32,
        /// Structure that was refused.
        structure: StructureType,
    },
    /// There is no catalog item to place.
    EmptyCatalog,
    /// The cell holds no objects to hide or show.
    NothingToHide(HexCoord),
    /// The grid refused the edit.
    Grid(GridError),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::CellOutOfBounds(c) => write!(f, "cannot perform action to cell {c}"),
            PlacementError::PoolExhausted => write!(f, "no more objects to add"),
            PlacementError::LevelOccupied { cell, level } => {
                write!(f, "level {level} of cell {cell} is occupied")
            }
            PlacementError::StructureConflict {
                cell,
                level,
                structure,
            } => write!(
                f,
                "a {} does not fit on level {level} of cell {cell}",
                structure.label()
            ),
            PlacementError::EmptyCatalog => write!(f, "the object catalog is empty"),
            PlacementError::NothingToHide(c) => write!(f, "nothing to hide in cell {c}"),
            PlacementError::Grid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PlacementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlacementError::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for PlacementError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::OutOfBounds(c) => PlacementError::CellOutOfBounds(c),
            other => PlacementError::Grid(other),
        }
    }
}

/// What a successful edit did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Objects were placed.
    Added {
        /// How many.
        count: usize,
    },
    /// Objects were removed.
    Removed {
        /// How many.
        count: usize,
    },
    /// Objects were hidden.
    Hidden {
        /// How many.
        count: usize,
    },
    /// Hidden objects were shown again.
    Shown {
        /// How many.
        count: usize,
    },
}

/// Edit applied by clicks and rectangle selections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum EditMode {
    /// Place objects.
    #[default]
    Add,
    /// Remove objects.
    Remove,
    /// Hide objects.
    Hide,
}

impl EditMode {
    /// The mode after this one (Add → Remove → Hide → Add).
    pub fn next(self) -> EditMode {
        match self {
            EditMode::Add => EditMode::Remove,
            EditMode::Remove => EditMode::Hide,
            EditMode::Hide => EditMode::Add,
        }
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            EditMode::Add => "Add",
            EditMode::Remove => "Remove",
            EditMode::Hide => "Hide",
        }
    }
}

/// Notification for the presentation layer.
#[derive(Message, Clone, Debug, PartialEq)]
pub enum PlacementNotice {
    /// The free object count changed.
    ObjectsRemaining {
        /// Inactive pooled objects.
        remaining: usize,
        /// Pool size.
        total: usize,
    },
    /// A cell's contents changed.
    CellChanged {
        /// The cell.
        cell: HexCoord,
    },
    /// An edit was refused.
    PlacementFailed {
        /// The target cell.
        cell: HexCoord,
        /// Why.
        error: PlacementError,
    },
}

impl fmt::Display for PlacementNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementNotice::ObjectsRemaining { remaining, total } => {
                write!(f, "Objects remaining {remaining}/{total}")
            }
            PlacementNotice::CellChanged { cell } => write!(f, "Cell {cell} changed"),
            PlacementNotice::PlacementFailed { cell, error } => {
                write!(f, "Cell {cell}: {error}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_grid_errors_become_cell_errors() {
        let c = HexCoord::new(-1, 3);
        assert_eq!(
            PlacementError::from(GridError::OutOfBounds(c)),
            PlacementError::CellOutOfBounds(c)
        );
        assert_eq!(
            PlacementError::from(GridError::HiddenContent(c)),
            PlacementError::Grid(GridError::HiddenContent(c))
        );
    }

    #[test]
    fn edit_modes_cycle() {
        let mut mode = EditMode::default();
        for _ in 0..3 {
            mode = mode.next();
        }
        assert_eq!(mode, EditMode::Add);
    }

    #[test]
    fn notices_read_like_hud_lines() {
        let n = PlacementNotice::ObjectsRemaining {
            remaining: 12,
            total: 20,
        };
        assert_eq!(n.to_string(), "Objects remaining 12/20");
    }
}
