//! Static terrain classification with a structure occupancy overlay.

use thiserror::Error;
use werian_defence_core::{
    CellCoord, CellRect, GridView, PassabilityPolicy, PlacementError, Terrain, TowerId,
};

/// Failures raised while building a grid from a textual layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The layout contained no rows or an empty first row.
    #[error("layout must contain at least one non-empty row")]
    EmptyLayout,
    /// A row's width disagreed with the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character did not name a terrain classification.
    #[error("unknown terrain glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
        /// Offending character.
        glyph: char,
    },
}

/// Terrain and structure occupancy stored in row-major order.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    terrain: Vec<Terrain>,
    occupancy: Vec<Option<TowerId>>,
    policy: PassabilityPolicy,
}

impl Grid {
    /// Creates a grid where every cell shares the same terrain.
    #[must_use]
    pub fn uniform(columns: u32, rows: u32, terrain: Terrain, policy: PassabilityPolicy) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            terrain: vec![terrain; capacity],
            occupancy: vec![None; capacity],
            policy,
        }
    }

    /// Parses a layout where `.` marks path cells and `#` marks buildable cells.
    pub fn parse<S: AsRef<str>>(rows: &[S], policy: PassabilityPolicy) -> Result<Self, GridError> {
        let width = rows
            .first()
            .map(|row| row.as_ref().chars().count())
            .unwrap_or(0);
        if width == 0 {
            return Err(GridError::EmptyLayout);
        }

        let mut terrain = Vec::with_capacity(width * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row: row_index,
                    expected: width,
                    found,
                });
            }
            for (column, glyph) in row.chars().enumerate() {
                let cell = Terrain::from_glyph(glyph).ok_or(GridError::UnknownGlyph {
                    row: row_index,
                    column,
                    glyph,
                })?;
                terrain.push(cell);
            }
        }

        let columns = u32::try_from(width).map_err(|_| GridError::EmptyLayout)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| GridError::EmptyLayout)?;
        let occupancy = vec![None; terrain.len()];
        Ok(Self {
            columns,
            rows: row_count,
            terrain,
            occupancy,
            policy,
        })
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Captures a read-only view of terrain and occupancy.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(
            &self.terrain,
            &self.occupancy,
            self.columns,
            self.rows,
            self.policy,
        )
    }

    /// Checks whether a structure could occupy the footprint.
    pub fn check_placement(&self, footprint: CellRect) -> Result<(), PlacementError> {
        let size = footprint.size();
        let origin = footprint.origin();
        let right = u64::from(origin.column()) + u64::from(size.width());
        let bottom = u64::from(origin.row()) + u64::from(size.height());
        if right > u64::from(self.columns) || bottom > u64::from(self.rows) {
            return Err(PlacementError::OutOfBounds);
        }

        let view = self.view();
        for cell in footprint.cells() {
            match view.terrain(cell) {
                None => return Err(PlacementError::OutOfBounds),
                Some(Terrain::Path) => return Err(PlacementError::NotBuildable),
                Some(Terrain::Buildable) => {}
            }
            if view.occupant(cell).is_some() {
                return Err(PlacementError::Occupied);
            }
        }
        Ok(())
    }

    /// Marks every footprint cell as occupied by the structure.
    ///
    /// The grid is left untouched when the placement is rejected.
    pub fn place_structure(
        &mut self,
        structure: TowerId,
        footprint: CellRect,
    ) -> Result<(), PlacementError> {
        self.check_placement(footprint)?;
        for cell in footprint.cells() {
            if let Some(index) = self.index(cell) {
                self.occupancy[index] = Some(structure);
            }
        }
        Ok(())
    }

    /// Clears every cell occupied by the structure, returning how many were freed.
    pub fn remove_structure(&mut self, structure: TowerId) -> usize {
        let mut freed = 0;
        for slot in &mut self.occupancy {
            if *slot == Some(structure) {
                *slot = None;
                freed += 1;
            }
        }
        freed
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
