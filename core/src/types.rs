use ndarray::Array2;

/// Single grid axis, used for row/column indices and board dimensions.
pub type Axis = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Grid position `(row, col)`.
pub type Pos = (Axis, Axis);

pub trait AsNdIndex {
    type Output;
    fn nd_index(self) -> Self::Output;
}

impl AsNdIndex for Pos {
    type Output = [usize; 2];

    fn nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Axis, b: Axis) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub trait AdjacentIterExt {
    fn iter_adjacent(&self, pos: Pos) -> AdjacentIter;
}

impl<T> AdjacentIterExt for Array2<T> {
    fn iter_adjacent(&self, pos: Pos) -> AdjacentIter {
        let dim = self.dim();
        let size = (dim.0.try_into().unwrap(), dim.1.try_into().unwrap());
        AdjacentIter::new(pos, size)
    }
}

const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `pos`, returning a value only when it remains in bounds.
fn apply_delta(pos: Pos, delta: (isize, isize), bounds: Pos) -> Option<Pos> {
    let (row, col) = pos;
    let (d_row, d_col) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(d_row.try_into().ok()?)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(d_col.try_into().ok()?)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterator over the up-to-8 in-bounds neighbors of a position.
#[derive(Debug)]
pub struct AdjacentIter {
    center: Pos,
    bounds: Pos,
    index: u8,
}

impl AdjacentIter {
    fn new(center: Pos, bounds: Pos) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for AdjacentIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= OFFSETS.len() {
                return None;
            }

            let next_item = apply_delta(self.center, OFFSETS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
