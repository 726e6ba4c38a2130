use log::trace;

//a pivot must be at least this fraction of the largest entry in its column
const PIVOT_THRESHOLD: f64 = 0.1;

/// The columns and rows an elimination could not pivot on. There are as many
/// of each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Singular {
    pub cols: Vec<usize>,
    pub rows: Vec<usize>,
}

/// Sparse LU factors of a square matrix `A`.
///
/// Step `s` of the elimination pivots on row `pivot_rows[s]` and column
/// `pivot_cols[s]`, chosen by the smallest Markowitz count
/// `(row count - 1) * (column count - 1)` among the entries that pass the
/// threshold test. `l_cols[s]` holds the multipliers of the rows eliminated
/// by that step, `u_rows[s]` the rest of the pivot row.
#[derive(Debug, Clone, Default)]
pub struct SparseLu {
    dim: usize,
    pivot_rows: Vec<usize>,
    pivot_cols: Vec<usize>,
    pivots: Vec<f64>,
    l_cols: Vec<Vec<(usize, f64)>>,
    u_rows: Vec<Vec<(usize, f64)>>,
}

//sums duplicate rows and drops tiny entries
fn compress(column: &[(usize, f64)], drop_tol: f64) -> Vec<(usize, f64)> {
    let mut column = column.to_vec();
    column.sort_by_key(|&(row, _)| row);

    let mut merged: Vec<(usize, f64)> = Vec::with_capacity(column.len());

    for (row, value) in column {
        match merged.last_mut() {
            Some(last) if last.0 == row => last.1 += value,
            _ => merged.push((row, value)),
        }
    }

    merged.retain(|(_, value)| value.abs() > drop_tol);
    merged
}

//(row, column, value) of the active entry with the smallest Markowitz count;
//ties go to the lower column, then the larger magnitude, then the lower row
fn choose_pivot(
    cols: &[Vec<(usize, f64)>],
    rows: &[Vec<usize>],
    col_done: &[bool],
) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, usize, f64)> = None;

    for (c, column) in cols.iter().enumerate() {
        if col_done[c] || column.is_empty() {
            continue;
        }

        let col_max = column.iter().fold(0., |max: f64, (_, v)| max.max(v.abs()));

        for &(r, v) in column {
            if v.abs() < PIVOT_THRESHOLD * col_max {
                continue;
            }

            let cost = rows[r].len().saturating_sub(1) * (column.len() - 1);

            let better = match best {
                None => true,
                Some((best_cost, best_row, best_col, best_value)) => {
                    cost < best_cost
                        || (cost == best_cost
                            && c == best_col
                            && (v.abs() > best_value.abs()
                                || (v.abs() == best_value.abs() && r < best_row)))
                }
            };

            if better {
                best = Some((cost, r, c, v));
            }
        }
    }

    best.map(|(_, r, c, v)| (r, c, v))
}

impl SparseLu {
    /// Factorizes the `dim × dim` matrix whose columns are lists of
    /// `(row, value)`. Entries at most `drop_tol` in magnitude, before or after
    /// an elimination step, count as zero.
    pub fn factorize(
        dim: usize,
        columns: &[Vec<(usize, f64)>],
        drop_tol: f64,
    ) -> Result<Self, Singular> {
        let mut cols: Vec<Vec<(usize, f64)>> = columns
            .iter()
            .map(|column| compress(column, drop_tol))
            .collect();

        //column pattern of every active row
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); dim];

        for (c, column) in cols.iter().enumerate() {
            for &(r, _) in column {
                rows[r].push(c);
            }
        }

        let mut row_done = vec![false; dim];
        let mut col_done = vec![false; dim];
        let mut lu = SparseLu {
            dim,
            ..Default::default()
        };

        for _ in 0..dim {
            let (r, c, pivot) = match choose_pivot(&cols, &rows, &col_done) {
                Some(choice) => choice,
                None => break,
            };

            let l_col: Vec<(usize, f64)> = cols[c]
                .iter()
                .filter(|&&(row, _)| row != r)
                .map(|&(row, value)| (row, value / pivot))
                .collect();

            cols[c].clear();
            col_done[c] = true;
            row_done[r] = true;

            for &(row, _) in &l_col {
                rows[row].retain(|&col| col != c);
            }

            let pivot_row = std::mem::take(&mut rows[r]);
            let mut u_row = Vec::with_capacity(pivot_row.len());

            for col in pivot_row {
                if col == c {
                    continue;
                }

                let a = match cols[col].iter().position(|&(row, _)| row == r) {
                    Some(p) => cols[col].swap_remove(p).1,
                    None => continue,
                };

                u_row.push((col, a));

                for &(row, l) in &l_col {
                    match cols[col].iter().position(|&(i, _)| i == row) {
                        Some(p) => {
                            let value = cols[col][p].1 - l * a;

                            if value.abs() > drop_tol {
                                cols[col][p].1 = value;
                            } else {
                                cols[col].swap_remove(p);
                                rows[row].retain(|&j| j != col);
                            }
                        }

                        None => {
                            let value = -l * a;

                            if value.abs() > drop_tol {
                                cols[col].push((row, value));
                                rows[row].push(col);
                            }
                        }
                    }
                }
            }

            lu.pivot_rows.push(r);
            lu.pivot_cols.push(c);
            lu.pivots.push(pivot);
            lu.l_cols.push(l_col);
            lu.u_rows.push(u_row);
        }

        if lu.pivots.len() < dim {
            return Err(Singular {
                cols: (0..dim).filter(|&c| !col_done[c]).collect(),
                rows: (0..dim).filter(|&r| !row_done[r]).collect(),
            });
        }

        trace!(
            "sparse lu of dimension {} with {} entries in l and {} in u",
            dim,
            lu.l_cols.iter().map(Vec::len).sum::<usize>(),
            lu.u_rows.iter().map(Vec::len).sum::<usize>() + dim
        );

        Ok(lu)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.dim
            + self.l_cols.iter().map(Vec::len).sum::<usize>()
            + self.u_rows.iter().map(Vec::len).sum::<usize>()
    }

    /// Solves `A x = rhs`. `rhs` is indexed by row on entry and holds `x`,
    /// indexed by column, on return.
    pub fn solve(&self, rhs: &mut [f64]) {
        let mut y = vec![0.; self.dim];

        for s in 0..self.dim {
            let t = rhs[self.pivot_rows[s]];
            y[s] = t;

            if t != 0. {
                for &(row, l) in &self.l_cols[s] {
                    rhs[row] -= l * t;
                }
            }
        }

        let mut x = vec![0.; self.dim];

        for s in (0..self.dim).rev() {
            let dot: f64 = self.u_rows[s].iter().map(|&(col, u)| u * x[col]).sum();
            x[self.pivot_cols[s]] = (y[s] - dot) / self.pivots[s];
        }

        rhs.copy_from_slice(&x);
    }

    /// Solves `Aᵀ y = rhs`. `rhs` is indexed by column on entry and holds `y`,
    /// indexed by row, on return.
    pub fn solve_transposed(&self, rhs: &mut [f64]) {
        let mut w = vec![0.; self.dim];

        for s in 0..self.dim {
            let w_s = rhs[self.pivot_cols[s]] / self.pivots[s];
            w[s] = w_s;

            if w_s != 0. {
                for &(col, u) in &self.u_rows[s] {
                    rhs[col] -= u * w_s;
                }
            }
        }

        let mut y = vec![0.; self.dim];

        for s in (0..self.dim).rev() {
            let dot: f64 = self.l_cols[s].iter().map(|&(row, l)| l * y[row]).sum();
            y[self.pivot_rows[s]] = w[s] - dot;
        }

        rhs.copy_from_slice(&y);
    }
}
