use super::{BitMatrix, SymbolSize};

/// Sampled modules of one symbol (`true` = dark), `size.modules` per side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    size: SymbolSize,
    modules: BitMatrix,
}

impl ModuleGrid {
    /// All-light grid of the given size
    pub fn new(size: SymbolSize) -> Self {
        Self {
            size,
            modules: BitMatrix::new(size.modules, size.modules),
        }
    }

    /// Symbol size
    pub fn size(&self) -> SymbolSize {
        self.size
    }

    /// Modules per side
    pub fn dimension(&self) -> usize {
        self.size.modules
    }

    /// Module at (row, col)
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.modules.get(col, row)
    }

    /// Set module at (row, col)
    pub fn set(&mut self, row: usize, col: usize, dark: bool) {
        self.modules.set(col, row, dark);
    }

    /// Invert module at (row, col)
    pub fn toggle(&mut self, row: usize, col: usize) {
        self.modules.toggle(col, row);
    }

    /// Draw the finder ring: solid L on the left and bottom, clock tracks on
    /// the top and right.
    pub fn draw_finder(&mut self) {
        let n = self.dimension();
        for i in 0..n {
            for (row, col) in [(i, 0), (n - 1, i), (0, i), (i, n - 1)] {
                if let Some(dark) = finder_module(n, row, col) {
                    self.set(row, col, dark);
                }
            }
        }
    }

    /// Fraction of finder-ring modules matching the expected pattern
    pub fn finder_agreement(&self) -> f32 {
        let n = self.dimension();
        let mut total = 0usize;
        let mut matching = 0usize;
        for row in 0..n {
            for col in 0..n {
                if let Some(expected) = finder_module(n, row, col) {
                    total += 1;
                    if self.get(row, col) == expected {
                        matching += 1;
                    }
                }
            }
        }
        matching as f32 / total.max(1) as f32
    }
}

/// Expected colour of a finder-ring module, `None` inside the data region.
///
/// Left column and bottom row are dark; the top row is dark on even
/// columns and the right column is dark on odd rows.
pub fn finder_module(modules: usize, row: usize, col: usize) -> Option<bool> {
    let last = modules - 1;
    if col == 0 || row == last {
        Some(true)
    } else if row == 0 {
        Some(col % 2 == 0)
    } else if col == last {
        Some(row % 2 == 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finder_pattern() {
        let size = SymbolSize::for_modules(10).unwrap();
        let mut grid = ModuleGrid::new(size);
        assert!(grid.finder_agreement() < 0.7);
        grid.draw_finder();
        assert_eq!(grid.finder_agreement(), 1.0);

        // Corners: L vertex dark, top-right light, bottom-right dark
        assert!(grid.get(9, 0));
        assert!(grid.get(0, 0));
        assert!(!grid.get(0, 9));
        assert!(grid.get(9, 9));
        // Interior untouched
        assert!(!grid.get(4, 4));
        assert_eq!(finder_module(10, 4, 4), None);
    }
}
