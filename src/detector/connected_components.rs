/// Connected components over a binary mask
/// Groups dark pixels into blobs that become symbol candidates
use crate::models::{BitMatrix, Point};

/// Union-Find data structure
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Root of the set containing `x`
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Path compression
        let mut cur = x;
        while self.parent[cur as usize] != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets containing `x` and `y`
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            self.parent[root_x as usize] = root_y;
        }
    }
}

/// Per-pixel component labels for a mask
pub struct ComponentLabels {
    width: usize,
    labels: Vec<u32>,
    count: usize,
}

impl ComponentLabels {
    /// Label of pixel (x, y); 0 for background, 1..=count otherwise
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.labels[y * self.width + x]
    }

    /// Number of components
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Two-pass 8-connected labelling of the set bits in `mask`
pub fn label_components(mask: &BitMatrix) -> ComponentLabels {
    let width = mask.width();
    let height = mask.height();

    let mut labels = vec![0u32; width * height];
    let mut next_label = 1u32;
    let mut uf = UnionFind::new(width * height / 2 + 2);

    for (x, y) in mask.iter_ones() {
        // Left, upper-left, up, upper-right
        let mut neighbors = [0u32; 4];
        if x > 0 {
            neighbors[0] = labels[y * width + x - 1];
        }
        if y > 0 {
            let above = (y - 1) * width;
            if x > 0 {
                neighbors[1] = labels[above + x - 1];
            }
            neighbors[2] = labels[above + x];
            if x + 1 < width {
                neighbors[3] = labels[above + x + 1];
            }
        }

        let idx = y * width + x;
        match neighbors.iter().copied().filter(|&l| l != 0).min() {
            None => {
                if next_label as usize >= uf.parent.len() {
                    let grown = uf.parent.len() * 2;
                    uf.parent.extend(uf.parent.len() as u32..grown as u32);
                }
                labels[idx] = next_label;
                next_label += 1;
            }
            Some(min_label) => {
                labels[idx] = min_label;
                for &l in neighbors.iter().filter(|&&l| l != 0 && l != min_label) {
                    uf.union(min_label, l);
                }
            }
        }
    }

    // Second pass: compact root labels to 1..=count
    let mut compact = vec![0u32; next_label as usize];
    let mut count = 0u32;
    for label in labels.iter_mut().filter(|l| **l != 0) {
        let root = uf.find(*label) as usize;
        if compact[root] == 0 {
            count += 1;
            compact[root] = count;
        }
        *label = compact[root];
    }

    ComponentLabels {
        width,
        labels,
        count: count as usize,
    }
}

/// Pixel centres of `pixels` grouped by the component of `labels` they fall in.
///
/// `pixels` is usually the undilated mask whose dilation produced `labels`, so
/// each group holds the original dark pixels of one blob.
pub fn group_pixels(labels: &ComponentLabels, pixels: &BitMatrix) -> Vec<Vec<Point>> {
    let mut groups = vec![Vec::new(); labels.count()];
    for (x, y) in pixels.iter_ones() {
        let label = labels.get(x, y);
        if label != 0 {
            groups[label as usize - 1].push(Point::new(x as f32 + 0.5, y as f32 + 0.5));
        }
    }
    groups
}
