use crate::cell::Cell;
use std::{
    iter,
    ops::{Index, IndexMut},
};

/// A 2-D container of cells the codec reads from and fills in.
pub trait TileGrid {
    /// Width in cells.
    fn width(&self) -> u32;

    /// Height in cells.
    fn height(&self) -> u32;

    /// Returns the cell at a position, or `None` if out of bounds.
    fn cell(&self, x: u32, y: u32) -> Option<Cell>;

    /// Replaces a `width`-wide rectangle of cells, given row by row,
    /// with its top left corner at `(x, y)`.
    /// Cells falling outside the grid are dropped.
    fn replace_region(&mut self, x: u32, y: u32, width: u32, cells: &[Cell]);
}

/// A single layer's grid of cells.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Layer {
    pub(crate) data: Vec<Cell>,
    /// Width of this layer.
    pub(crate) width: u32,
    /// Height of this layer.
    pub(crate) height: u32,
}

impl IntoIterator for Layer {
    type Item = Cell;
    type IntoIter = std::vec::IntoIter<Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl Layer {
    /// Constructs an empty layer of a size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut layer = Layer::default();
        layer.resize(width, height);
        layer
    }

    /// Resize the layer, filling new cells with empty ones.
    ///
    /// If the width is changed, this will reallocate the data buffer!
    pub fn resize(&mut self, width: u32, height: u32) {
        if (self.width == width && self.height == height)
            || ((self.width == 0 || self.height == 0) && (width == 0 || height == 0))
        {
            // This does nothing!
            self.width = width;
            self.height = height;
            return;
        }
        if width == 0 || height == 0 {
            // Clear
            self.width = width;
            self.height = height;
            self.data.clear();
            return;
        }
        if self.width == 0 || self.height == 0 {
            // Construct
            self.width = width;
            self.height = height;
            self.data = vec![Cell::default(); width as usize * height as usize];
            return;
        }
        let old_width = self.width as usize;
        if self.height > height {
            // Remove rows
            self.data.truncate(old_width * height as usize);
        } else if self.height < height {
            // Add rows
            self.data
                .resize(old_width * height as usize, Cell::default());
        }
        if self.width != width {
            let width = width as usize;
            let chunks = self.data.chunks(old_width);
            self.data = if old_width < width {
                // Old less than new, add elements
                chunks
                    .flat_map(|chunk| {
                        chunk
                            .iter()
                            .copied()
                            .chain(iter::repeat(Cell::default()).take(width - old_width))
                    })
                    .collect()
            } else {
                // Truncate elements
                chunks
                    .flat_map(|chunk| chunk.iter().copied().take(width))
                    .collect()
            };
        }
        self.width = width;
        self.height = height;
    }

    /// Returns the width of the layer.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the layer.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the cells in row-major order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.data
    }

    /// Get a cell by position.
    /// Returns None if out of bounds
    #[must_use]
    pub fn get(&self, (x, y): (u32, u32)) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width as usize + x as usize)
    }

    /// Get a cell by position, mutably.
    /// Returns None if out of bounds
    pub fn get_mut(&mut self, (x, y): (u32, u32)) -> Option<&mut Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y as usize * self.width as usize + x as usize)
    }

    /// Whether any cell draws something.
    #[must_use]
    pub fn has_tiles(&self) -> bool {
        self.data.iter().any(|cell| !cell.is_empty())
    }
}

impl TileGrid for Layer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn cell(&self, x: u32, y: u32) -> Option<Cell> {
        self.get((x, y)).copied()
    }

    fn replace_region(&mut self, x: u32, y: u32, width: u32, cells: &[Cell]) {
        if width == 0 {
            return;
        }
        for (row, chunk) in cells.chunks(width as usize).enumerate() {
            let Some(cy) = y.checked_add(row as u32).filter(|&cy| cy < self.height) else {
                break;
            };
            for (column, &cell) in chunk.iter().enumerate() {
                if let Some(target) = x
                    .checked_add(column as u32)
                    .and_then(|cx| self.get_mut((cx, cy)))
                {
                    *target = cell;
                }
            }
        }
    }
}

impl Index<(u32, u32)> for Layer {
    type Output = Cell;

    /// Index by position and return a reference.
    ///
    /// # Panics
    /// Panics if index is out of bounds.
    fn index(&self, (x, y): (u32, u32)) -> &Self::Output {
        assert!(x < self.width, "x {x} out of bounds for width {}", self.width);
        &self.data[y as usize * self.width as usize + x as usize]
    }
}

impl IndexMut<(u32, u32)> for Layer {
    /// Index by position and return a mutable reference.
    ///
    /// # Panics
    /// Panics if index is out of bounds.
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut Self::Output {
        assert!(x < self.width, "x {x} out of bounds for width {}", self.width);
        &mut self.data[y as usize * self.width as usize + x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_keeps_overlap() {
        let mut layer = Layer::new(3, 3);
        layer[(2, 1)] = Cell::tile(7);
        layer[(0, 2)] = Cell::tile(9);
        // This sequence covers all cases of resize
        layer.resize(5, 3);
        assert_eq!(layer[(2, 1)], Cell::tile(7));
        layer.resize(5, 2);
        assert!(layer.get((0, 2)).is_none());
        layer.resize(2, 2);
        assert!(layer.get((2, 1)).is_none());
        layer.resize(3, 3);
        assert_eq!(layer.cells().len(), 9);
        assert!(!layer.has_tiles());
        layer.resize(0, 4);
        assert_eq!((layer.width(), layer.height()), (0, 4));
        assert!(layer.cells().is_empty());
        layer.resize(2, 4);
        assert_eq!(layer.cells().len(), 8);
    }

    #[test]
    fn region_is_clipped() {
        let mut layer = Layer::new(3, 2);
        let cells: Vec<Cell> = (1..=6).map(Cell::tile).collect();
        layer.replace_region(1, 1, 3, &cells);
        assert_eq!(layer[(1, 1)], Cell::tile(1));
        assert_eq!(layer[(2, 1)], Cell::tile(2));
        assert_eq!(layer[(0, 1)], Cell::default());
        assert!(layer.has_tiles());
        assert_eq!(TileGrid::cell(&layer, 2, 1), Some(Cell::tile(2)));
        assert_eq!(TileGrid::cell(&layer, 3, 1), None);
    }
}
