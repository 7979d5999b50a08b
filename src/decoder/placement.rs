//! ECC 200 codeword placement
//!
//! Codewords are laid diagonally over the mapping matrix (the symbol without
//! its finder ring) in the "utah" shape, with four special corner shapes and
//! wrap-around at the edges. Mapping cell `(r, c)` is symbol module
//! `(r + 1, c + 1)`.

use crate::models::{ModuleGrid, SymbolSize};

/// Module positions (mapping-matrix row, column) of each codeword, most
/// significant bit first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    nrow: usize,
    ncol: usize,
    positions: Vec<[(usize, usize); 8]>,
}

struct Builder {
    nrow: isize,
    ncol: isize,
    cells: Vec<Option<(usize, usize)>>,
    next: usize,
}

impl Builder {
    /// Out-of-range anchors count as filled so the sweeps skip them
    fn filled(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 || row >= self.nrow || col >= self.ncol {
            return true;
        }
        self.cells[(row * self.ncol + col) as usize].is_some()
    }

    fn module(&mut self, mut row: isize, mut col: isize, codeword: usize, bit: usize) {
        if row < 0 {
            row += self.nrow;
            col += 4 - ((self.nrow + 4) % 8);
        }
        if col < 0 {
            col += self.ncol;
            row += 4 - ((self.ncol + 4) % 8);
        }
        self.cells[(row * self.ncol + col) as usize] = Some((codeword, bit));
    }

    fn place(&mut self, shape: &[(isize, isize); 8]) {
        let codeword = self.next;
        self.next += 1;
        for (bit, &(row, col)) in shape.iter().enumerate() {
            self.module(row, col, codeword, bit);
        }
    }

    fn utah(&mut self, row: isize, col: isize) {
        self.place(&[
            (row - 2, col - 2),
            (row - 2, col - 1),
            (row - 1, col - 2),
            (row - 1, col - 1),
            (row - 1, col),
            (row, col - 2),
            (row, col - 1),
            (row, col),
        ]);
    }

    fn corner1(&mut self) {
        let (r, c) = (self.nrow, self.ncol);
        self.place(&[
            (r - 1, 0),
            (r - 1, 1),
            (r - 1, 2),
            (0, c - 2),
            (0, c - 1),
            (1, c - 1),
            (2, c - 1),
            (3, c - 1),
        ]);
    }

    fn corner2(&mut self) {
        let (r, c) = (self.nrow, self.ncol);
        self.place(&[
            (r - 3, 0),
            (r - 2, 0),
            (r - 1, 0),
            (0, c - 4),
            (0, c - 3),
            (0, c - 2),
            (0, c - 1),
            (1, c - 1),
        ]);
    }

    fn corner3(&mut self) {
        let (r, c) = (self.nrow, self.ncol);
        self.place(&[
            (r - 3, 0),
            (r - 2, 0),
            (r - 1, 0),
            (0, c - 2),
            (0, c - 1),
            (1, c - 1),
            (2, c - 1),
            (3, c - 1),
        ]);
    }

    fn corner4(&mut self) {
        let (r, c) = (self.nrow, self.ncol);
        self.place(&[
            (r - 1, 0),
            (r - 1, c - 1),
            (0, c - 3),
            (0, c - 2),
            (0, c - 1),
            (1, c - 3),
            (1, c - 2),
            (1, c - 1),
        ]);
    }

    fn run(&mut self) {
        let (nrow, ncol) = (self.nrow, self.ncol);
        let mut row: isize = 4;
        let mut col: isize = 0;

        loop {
            if row == nrow && col == 0 {
                self.corner1();
            }
            if row == nrow - 2 && col == 0 && ncol % 4 != 0 {
                self.corner2();
            }
            if row == nrow - 2 && col == 0 && ncol % 8 == 4 {
                self.corner3();
            }
            if row == nrow + 4 && col == 2 && ncol % 8 == 0 {
                self.corner4();
            }

            // Sweep up and to the right
            loop {
                if row < nrow && col >= 0 && !self.filled(row, col) {
                    self.utah(row, col);
                }
                row -= 2;
                col += 2;
                if !(row >= 0 && col < ncol) {
                    break;
                }
            }
            row += 1;
            col += 3;

            // Sweep down and to the left
            loop {
                if row >= 0 && col < ncol && !self.filled(row, col) {
                    self.utah(row, col);
                }
                row += 2;
                col -= 2;
                if !(row < nrow && col >= 0) {
                    break;
                }
            }
            row += 3;
            col += 1;

            if !(row < nrow || col < ncol) {
                break;
            }
        }
    }
}

impl Placement {
    /// Placement over an `nrow x ncol` mapping matrix (both even, >= 6)
    pub fn new(nrow: usize, ncol: usize) -> Self {
        let mut builder = Builder {
            nrow: nrow as isize,
            ncol: ncol as isize,
            cells: vec![None; nrow * ncol],
            next: 0,
        };
        builder.run();

        let mut positions = vec![[(0usize, 0usize); 8]; builder.next];
        for (idx, cell) in builder.cells.iter().enumerate() {
            if let Some((codeword, bit)) = *cell {
                positions[codeword][bit] = (idx / ncol, idx % ncol);
            }
        }
        Self {
            nrow,
            ncol,
            positions,
        }
    }

    /// Placement for a supported symbol size
    pub fn for_size(size: SymbolSize) -> Self {
        Self::new(size.mapping_size(), size.mapping_size())
    }

    /// Number of codewords that fit
    pub fn codeword_count(&self) -> usize {
        self.positions.len()
    }

    /// Module positions of one codeword, most significant bit first
    pub fn positions(&self, codeword: usize) -> &[(usize, usize); 8] {
        &self.positions[codeword]
    }

    /// Mapping cells no codeword covers (the bottom-right 2x2 in some sizes)
    pub fn unused_cells(&self) -> Vec<(usize, usize)> {
        let mut used = vec![false; self.nrow * self.ncol];
        for &(r, c) in self.positions.iter().flatten() {
            used[r * self.ncol + c] = true;
        }
        (0..self.nrow * self.ncol)
            .filter(|&i| !used[i])
            .map(|i| (i / self.ncol, i % self.ncol))
            .collect()
    }

    /// Read every codeword from a grid
    pub fn read_codewords(&self, grid: &ModuleGrid) -> Vec<u8> {
        self.positions
            .iter()
            .map(|bits| {
                bits.iter()
                    .fold(0u8, |acc, &(r, c)| (acc << 1) | grid.get(r + 1, c + 1) as u8)
            })
            .collect()
    }

    /// Write codewords into a grid; extra codewords are ignored
    pub fn write_codewords(&self, grid: &mut ModuleGrid, codewords: &[u8]) {
        for (bits, &value) in self.positions.iter().zip(codewords) {
            for (i, &(r, c)) in bits.iter().enumerate() {
                grid.set(r + 1, c + 1, value & (0x80 >> i) != 0);
            }
        }
    }
}
