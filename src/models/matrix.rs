const WORD_BITS: usize = 64;

/// Packed binary mask (thresholded frames, module grids).
///
/// Each row starts on a fresh `u64` word so rows can be scanned word by word;
/// reads outside the matrix return `false` and writes are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    row_words: usize,
    words: Vec<u64>,
}

impl BitMatrix {
    /// All-clear matrix
    pub fn new(width: usize, height: usize) -> Self {
        let row_words = width.div_ceil(WORD_BITS);
        Self {
            width,
            height,
            row_words,
            words: vec![0; row_words * height],
        }
    }

    /// Matrix with bit (x, y) set where `f(x, y)` holds
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut matrix = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    matrix.words[y * matrix.row_words + x / WORD_BITS] |= 1 << (x % WORD_BITS);
                }
            }
        }
        matrix
    }

    /// Width in bits
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rows
    pub fn height(&self) -> usize {
        self.height
    }

    fn locate(&self, x: usize, y: usize) -> Option<(usize, u64)> {
        (x < self.width && y < self.height)
            .then(|| (y * self.row_words + x / WORD_BITS, 1u64 << (x % WORD_BITS)))
    }

    /// Bit at (x, y)
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.locate(x, y)
            .is_some_and(|(word, mask)| self.words[word] & mask != 0)
    }

    /// Set or clear bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if let Some((word, mask)) = self.locate(x, y) {
            if value {
                self.words[word] |= mask;
            } else {
                self.words[word] &= !mask;
            }
        }
    }

    /// Invert bit at (x, y)
    pub fn toggle(&mut self, x: usize, y: usize) {
        if let Some((word, mask)) = self.locate(x, y) {
            self.words[word] ^= mask;
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Coordinates of the set bits in row-major order, skipping empty words
    pub fn iter_ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.words
            .chunks(self.row_words.max(1))
            .take(self.height)
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter().enumerate().flat_map(move |(w, &word)| {
                    let mut bits = word;
                    std::iter::from_fn(move || {
                        if bits == 0 {
                            return None;
                        }
                        let bit = bits.trailing_zeros() as usize;
                        bits &= bits - 1;
                        Some((w * WORD_BITS + bit, y))
                    })
                })
            })
    }
}
