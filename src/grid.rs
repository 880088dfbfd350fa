//! Module grid storage and bounds-safe sampling.
//!
//! A [`ModuleGrid`] is the square matrix of dark/light modules produced by the encoder,
//! quiet zone included. Rendering code reads it through [`ModuleGrid::is_dark_at`], which
//! treats every coordinate outside the grid as light so that neighbour queries at the edges
//! never need their own guards.

/// An immutable square grid of modules, `true` meaning dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    size: usize,
    // Row-major: index = y * size + x.
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Builds a grid of the given size by asking `f(x, y)` for every module.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut modules = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                modules.push(f(x, y));
            }
        }
        ModuleGrid { size, modules }
    }

    /// Builds a grid from rows of modules.
    ///
    /// Returns `None` when the rows do not form a square.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.as_ref().len() != size) {
            return None;
        }
        Some(ModuleGrid {
            size,
            modules: rows.iter().flat_map(|row| row.as_ref().iter().copied()).collect(),
        })
    }

    /// Returns a grid whose every module has the same state.
    pub fn filled(size: usize, dark: bool) -> Self {
        ModuleGrid { size, modules: vec![dark; size * size] }
    }

    /// Returns a copy of this grid surrounded by `border` light modules on every side.
    pub fn with_quiet_zone(&self, border: usize) -> Self {
        let size = self.size + 2 * border;
        ModuleGrid::from_fn(size, |x, y| {
            x >= border && y >= border && self.is_dark_at((x - border) as i64, (y - border) as i64)
        })
    }

    /// Width and height of the grid in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns whether the in-range module at column `x`, row `y` is dark.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is not below [`size`](Self::size).
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        assert!(x < self.size && y < self.size, "Module coordinate out of range");
        self.modules[y * self.size + x]
    }

    /// Returns whether the module at (`x`, `y`) is dark, treating out-of-range coordinates as
    /// light.
    pub fn is_dark_at(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }

    /// Returns the grid rotated by 180 degrees.
    pub fn rotated_half_turn(&self) -> Self {
        let last = self.size.saturating_sub(1);
        ModuleGrid::from_fn(self.size, |x, y| self.is_dark(last - x, last - y))
    }

    /// Number of dark modules.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&dark| dark).count()
    }
}
