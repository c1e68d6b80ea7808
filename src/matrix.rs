use itertools::multizip;
use rand::distributions::Distribution;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::ops::{Index, IndexMut};

/// A dense matrix of weights.
///
/// Entry `(r, c)` holds the weight from source unit `r` to destination unit
/// `c`, so each row gathers the outgoing weights of one source unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMat")]
pub struct Mat {
    rows: usize,
    cols: usize,
    data: Vec<f64>, // row-major array
}

impl Mat {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Mat {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Draws every entry independently from `distribution`, in row-major
    /// order.
    pub fn random<D, R>(distribution: &D, rng: &mut R, rows: usize, cols: usize) -> Self
    where
        D: Distribution<f64>,
        R: Rng + ?Sized,
    {
        let data = (0..rows * cols).map(|_| distribution.sample(rng)).collect();
        Mat { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the outgoing weights of source unit `r`.
    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Accumulates `ys[c] += Σ_r xs[r] * self[(r, c)]`.
    pub fn feed(&self, xs: &[f64], ys: &mut [f64]) {
        debug_assert_eq!(xs.len(), self.rows);
        debug_assert_eq!(ys.len(), self.cols);
        if self.cols == 0 {
            return;
        }
        for (x, row) in xs.iter().zip(self.data.chunks_exact(self.cols)) {
            for (y, w) in ys.iter_mut().zip(row) {
                *y += x * w;
            }
        }
    }

    /// Accumulates `xs[r] += Σ_c self[(r, c)] * ds[c]`, carrying errors at
    /// the destination units back to the source units.
    pub fn feed_back(&self, ds: &[f64], xs: &mut [f64]) {
        debug_assert_eq!(ds.len(), self.cols);
        debug_assert_eq!(xs.len(), self.rows);
        if self.cols == 0 {
            return;
        }
        for (x, row) in xs.iter_mut().zip(self.data.chunks_exact(self.cols)) {
            for (d, w) in ds.iter().zip(row) {
                *x += d * w;
            }
        }
    }

    /// Applies one gradient step with momentum.
    ///
    /// For every entry the change is `ds[c] * xs[r]`; the weight moves by
    /// `rate * change + factor * momentum[(r, c)]` and the change is then
    /// remembered in `momentum` for the next step.
    pub fn descend(&mut self, momentum: &mut Mat, rate: f64, factor: f64, xs: &[f64], ds: &[f64]) {
        debug_assert_eq!(self.shape(), momentum.shape());
        debug_assert_eq!(xs.len(), self.rows);
        debug_assert_eq!(ds.len(), self.cols);
        let cols = self.cols;
        if cols == 0 {
            return;
        }
        for (x, row, last) in multizip((
            xs.iter(),
            self.data.chunks_exact_mut(cols),
            momentum.data.chunks_exact_mut(cols),
        )) {
            for (d, w, m) in multizip((ds.iter(), row.iter_mut(), last.iter_mut())) {
                let change = d * x;
                *w += rate * change + factor * *m;
                *m = change;
            }
        }
    }
}

impl Index<(usize, usize)> for Mat {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        assert!(c < self.cols);
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Mat {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        assert!(c < self.cols);
        &mut self.data[r * self.cols + c]
    }
}

/// The unchecked wire form of a [`Mat`].
#[derive(Deserialize)]
struct RawMat {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[derive(Debug)]
pub struct ShapeError {
    rows: usize,
    cols: usize,
    len: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "a {}x{} matrix needs {} entries, found {}",
            self.rows,
            self.cols,
            self.rows * self.cols,
            self.len
        )
    }
}

impl TryFrom<RawMat> for Mat {
    type Error = ShapeError;

    fn try_from(raw: RawMat) -> Result<Self, ShapeError> {
        if raw.rows.checked_mul(raw.cols) != Some(raw.data.len()) {
            return Err(ShapeError {
                rows: raw.rows,
                cols: raw.cols,
                len: raw.data.len(),
            });
        }
        Ok(Mat {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Uniform;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_strategy::proptest;

    fn mat(rows: usize, cols: usize, data: &[f64]) -> Mat {
        Mat {
            rows,
            cols,
            data: data.to_vec(),
        }
    }

    #[test]
    fn feed_multiplies_by_rows() {
        let m = mat(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut ys = [1.0; 3];
        m.feed(&[1.0, -1.0], &mut ys);
        assert_eq!(ys, [-2.0, -2.0, -2.0]);
    }

    #[test]
    fn feed_back_multiplies_by_columns() {
        let m = mat(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut xs = [0.0; 2];
        m.feed_back(&[1.0, 0.0, 2.0], &mut xs);
        assert_eq!(xs, [7.0, 16.0]);
    }

    #[test]
    fn descend_blends_previous_change() {
        let mut w = Mat::zeros(1, 2);
        let mut m = Mat::zeros(1, 2);
        w.descend(&mut m, 0.5, 0.25, &[2.0], &[1.0, -1.0]);
        assert_eq!(w, mat(1, 2, &[1.0, -1.0]));
        assert_eq!(m, mat(1, 2, &[2.0, -2.0]));

        w.descend(&mut m, 0.5, 0.25, &[2.0], &[0.0, 0.0]);
        assert_eq!(w, mat(1, 2, &[1.5, -1.5]));
        assert_eq!(m, Mat::zeros(1, 2));
    }

    #[proptest]
    fn random_stays_in_range(#[strategy(1usize..6)] rows: usize, #[strategy(1usize..6)] cols: usize, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let m = Mat::random(&Uniform::new(-1.0, 1.0), &mut rng, rows, cols);
        assert_eq!(m.shape(), (rows, cols));
        for r in 0..rows {
            assert!(m.row(r).iter().all(|w| (-1.0..1.0).contains(w)));
        }
    }

    #[test]
    fn rejects_truncated_data() {
        let json = r#"{"rows":2,"cols":2,"data":[1.0,2.0,3.0]}"#;
        assert!(serde_json::from_str::<Mat>(json).is_err());
    }

    #[test]
    fn index_is_row_major() {
        let mut m = mat(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m[(1, 0)], 3.0);
        m[(0, 1)] = 7.0;
        assert_eq!(m.row(0), &[1.0, 7.0]);
    }
}
