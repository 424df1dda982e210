//! Parsing of `--place` arguments such as `archer@6,6`.

use std::str::FromStr;

use glam::Vec2;
use thiserror::Error;
use werian_defence_core::{CellCoord, TowerKind};

/// Tower requested on the command line, centred on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlacementRequest {
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
}

impl PlacementRequest {
    /// World position of the requested cell's centre.
    pub(crate) fn anchor(&self, cell_size: f32) -> Vec2 {
        self.cell.center(cell_size)
    }
}

/// Reasons a `--place` argument could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum PlacementParseError {
    #[error("expected KIND@COLUMN,ROW, got `{0}`")]
    Malformed(String),
    #[error("unknown tower kind `{0}`, expected `archer` or `fire`")]
    UnknownKind(String),
    #[error("invalid cell coordinate `{0}`")]
    InvalidCell(String),
}

impl FromStr for PlacementRequest {
    type Err = PlacementParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, cell) = value
            .trim()
            .split_once('@')
            .ok_or_else(|| PlacementParseError::Malformed(value.to_owned()))?;

        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "archer" => TowerKind::Archer,
            "fire" => TowerKind::Fire,
            other => return Err(PlacementParseError::UnknownKind(other.to_owned())),
        };

        let (column, row) = cell
            .split_once(',')
            .ok_or_else(|| PlacementParseError::InvalidCell(cell.to_owned()))?;
        let column = column
            .trim()
            .parse::<u32>()
            .map_err(|_| PlacementParseError::InvalidCell(cell.to_owned()))?;
        let row = row
            .trim()
            .parse::<u32>()
            .map_err(|_| PlacementParseError::InvalidCell(cell.to_owned()))?;

        Ok(Self {
            kind,
            cell: CellCoord::new(column, row),
        })
    }
}
