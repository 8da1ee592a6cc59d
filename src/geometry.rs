//! Grid geometry - cell coordinates and neighbourhoods

use serde::{Deserialize, Serialize};

/// Cell position on the field; `row` runs along the depth, `col` along the width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev distance, the metric the square neighbourhoods use.
    pub fn distance(&self, other: Location) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Rectangular bounds shared by both field buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    depth: usize,
    width: usize,
}

impl Grid {
    pub fn new(depth: usize, width: usize) -> Self {
        Self { depth, width }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cell_count(&self) -> usize {
        self.depth * self.width
    }

    pub fn contains(&self, location: Location) -> bool {
        location.row < self.depth && location.col < self.width
    }

    /// In-bounds cells within `radius` of `center`, excluding the center itself,
    /// in row-major order. Out-of-bounds centers have no neighbours.
    pub fn neighbourhood(&self, center: Location, radius: usize) -> Vec<Location> {
        if !self.contains(center) || radius == 0 {
            return Vec::new();
        }
        let rows = center.row.saturating_sub(radius)..=(center.row + radius).min(self.depth - 1);
        let mut cells = Vec::with_capacity((2 * radius + 1).pow(2) - 1);
        for row in rows {
            let cols =
                center.col.saturating_sub(radius)..=(center.col + radius).min(self.width - 1);
            for col in cols {
                let cell = Location::new(row, col);
                if cell != center {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.depth).flat_map(move |row| (0..self.width).map(move |col| Location::new(row, col)))
    }
}
