use std::fmt;
use std::ops::Index;

use serde::Serialize;

use crate::{Position, element::Element};

/// Represents errors that can occur when building a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Grid size ({width}, {height}) needs {expected} cells, got {actual}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Grid dimensions must be positive, got ({width}, {height})")]
    EmptyDimensions { width: usize, height: usize },
}

/// A row-major 2D grid. All (x, y) to index conversion, in both directions,
/// lives here.
///
/// Only [`Grid::from_cells`] builds one, so `cells.len() == width * height`
/// always holds. No `Deserialize`: that would bypass the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Wraps an already row-major vector of cells.
    ///
    /// Fails unless `cells.len() == width * height`.
    pub fn from_cells(width: usize, height: usize, cells: Vec<T>) -> Result<Self, GridError> {
        let expected = width.checked_mul(height).ok_or(GridError::SizeMismatch {
            width,
            height,
            expected: usize::MAX,
            actual: cells.len(),
        })?;
        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                width,
                height,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Flat index of (x, y), or `None` when out of bounds.
    #[inline]
    pub fn coords_to_index(&self, x: usize, y: usize) -> Option<usize> {
        if self.is_valid(x, y) {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// (x, y) of a flat index, or `None` when out of bounds.
    #[inline]
    pub fn index_to_coords(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.cells.len()).then(|| (index % self.width, index / self.width))
    }

    #[inline]
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Returns `None` if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        let index = self.coords_to_index(x, y)?;
        self.cells.get(index)
    }

    /// Yields `((x, y), &T)` in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| Some((self.index_to_coords(index)?, cell)))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    fn index_or_panic(&self, x: usize, y: usize) -> usize {
        match self.coords_to_index(x, y) {
            Some(idx) => idx,
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                x, y, self.width, self.height
            ),
        }
    }
}

/// Allows indexing the grid using `(usize, usize)` coordinates.
impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.cells[self.index_or_panic(x, y)]
    }
}

/// Indexing using Position coordinates
impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Position) -> &Self::Output {
        &self.cells[self.index_or_panic(index.x, index.y)]
    }
}

/// A parsed level grid. Write-once: the only ways to build one validate the
/// dimensions, and nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Map {
    grid: Grid<Element>,
}

impl Map {
    /// Builds a map from row-major elements.
    pub fn from_elements(
        width: usize,
        height: usize,
        elements: Vec<Element>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        Ok(Map {
            grid: Grid::from_cells(width, height, elements)?,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Returns the element at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`. Callers own the bounds check.
    #[inline]
    pub fn element(&self, x: usize, y: usize) -> Element {
        self.grid[(x, y)]
    }

    /// Bounds-checked variant of [`Map::element`].
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Element> {
        self.grid.get(x, y).copied()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.grid.is_valid(position.x, position.y)
    }

    /// Yields `((x, y), element)` in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = ((usize, usize), Element)> + '_ {
        self.grid.enumerate().map(|(coords, element)| (coords, *element))
    }

    /// Row-major slice of all elements.
    pub fn elements(&self) -> &[Element] {
        self.grid.as_slice()
    }
}

impl Index<Position> for Map {
    type Output = Element;

    fn index(&self, index: Position) -> &Self::Output {
        &self.grid[index]
    }
}

/// Writes the map in its file format, so the output parses back to an equal map.
impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.width(), self.height())?;
        for row in self.elements().chunks(self.width()) {
            let line: String = row.iter().map(Element::to_char).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
