use crate::error::DualplexError;
use crate::options::{SimplexOptions, SimplexStrategy};
use crate::simplex::matrix::Matrix;
use crate::simplex::work::WorkArrays;

use rayon::prelude::*;

//smallest number of rows or columns handed to one thread
const MIN_CHUNK: usize = 64;

/// A nonbasic variable that may enter the basis, as seen by the ratio test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub var: usize,
    pub alpha: f64,
    pub ratio: f64,
    pub harris: f64,
    pub range: f64,
    pub degenerate: bool,
}

/// The pricing steps of a dual simplex iteration.
///
/// Every implementation must choose the same row and compute the same pivotal
/// row as [`SerialPricing`], whatever the number of threads.
pub trait Pricing: Send + Sync {
    /// Basis position of the leaving variable: the one with the largest
    /// `infeasibility² / weight`, the lowest position among ties. `None` when
    /// the basic variables are primal feasible.
    fn choose_row(&self, work: &WorkArrays, weights: &[f64], tol: f64) -> Option<usize>;

    /// `row_ap[j] = row_epᵀ a_j` for every nonbasic structural column `j`.
    fn price_row(
        &self,
        matrix: &Matrix,
        row_ep: &nalgebra::DVector<f64>,
        nonbasic_flag: &[bool],
        row_ap: &mut [f64],
    );

    /// Entering candidates `candidate(var)` over `0..num_var`, in variable order.
    fn collect_candidates(
        &self,
        num_var: usize,
        candidate: &(dyn Fn(usize) -> Option<Candidate> + Sync),
    ) -> Vec<Candidate> {
        (0..num_var).filter_map(|var| candidate(var)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RowCandidate {
    merit: f64,
    position: usize,
}

impl RowCandidate {
    //strict total order: larger merit wins, then the lower position
    #[inline]
    fn better_than(&self, other: &RowCandidate) -> bool {
        self.merit > other.merit || (self.merit == other.merit && self.position < other.position)
    }
}

fn best_row(
    work: &WorkArrays,
    weights: &[f64],
    tol: f64,
    positions: std::ops::Range<usize>,
) -> Option<RowCandidate> {
    let mut best: Option<RowCandidate> = None;

    for position in positions {
        let infeasibility = work.primal_infeasibility(position, tol);

        if infeasibility <= 0. {
            continue;
        }

        let candidate = RowCandidate {
            merit: infeasibility * infeasibility / weights[position],
            position,
        };

        if best.map_or(true, |best| candidate.better_than(&best)) {
            best = Some(candidate);
        }
    }

    best
}

//merges per-chunk results in chunk order
fn merge(candidates: impl Iterator<Item = Option<RowCandidate>>) -> Option<usize> {
    candidates
        .flatten()
        .fold(None, |best: Option<RowCandidate>, candidate| match best {
            Some(best) if !candidate.better_than(&best) => Some(best),
            _ => Some(candidate),
        })
        .map(|candidate| candidate.position)
}

fn chunk_size(len: usize, num_threads: usize) -> usize {
    ((len + num_threads - 1) / num_threads).max(MIN_CHUNK)
}

#[derive(Debug, Default)]
pub struct SerialPricing {}

impl Pricing for SerialPricing {
    fn choose_row(&self, work: &WorkArrays, weights: &[f64], tol: f64) -> Option<usize> {
        best_row(work, weights, tol, 0..work.base_value.len()).map(|c| c.position)
    }

    fn price_row(
        &self,
        matrix: &Matrix,
        row_ep: &nalgebra::DVector<f64>,
        nonbasic_flag: &[bool],
        row_ap: &mut [f64],
    ) {
        matrix.price(row_ep, nonbasic_flag, row_ap);
    }
}

/// Chooses the leaving row over chunks of rows in parallel.
pub struct MultiChunkPricing {
    pool: rayon::ThreadPool,
}

impl MultiChunkPricing {
    pub fn new(num_threads: usize) -> Result<Self, DualplexError> {
        Ok(Self {
            pool: build_pool(num_threads)?,
        })
    }
}

impl Pricing for MultiChunkPricing {
    fn choose_row(&self, work: &WorkArrays, weights: &[f64], tol: f64) -> Option<usize> {
        let num_row = work.base_value.len();
        let chunk = chunk_size(num_row, self.pool.current_num_threads());
        let num_chunks = (num_row + chunk - 1) / chunk;

        let results: Vec<Option<RowCandidate>> = self.pool.install(|| {
            (0..num_chunks)
                .into_par_iter()
                .map(|c| best_row(work, weights, tol, c * chunk..((c + 1) * chunk).min(num_row)))
                .collect()
        });

        merge(results.into_iter())
    }

    fn price_row(
        &self,
        matrix: &Matrix,
        row_ep: &nalgebra::DVector<f64>,
        nonbasic_flag: &[bool],
        row_ap: &mut [f64],
    ) {
        matrix.price(row_ep, nonbasic_flag, row_ap);
    }
}

/// Prices the pivotal row over chunks of columns in parallel.
pub struct TaskPricing {
    pool: rayon::ThreadPool,
}

impl TaskPricing {
    pub fn new(num_threads: usize) -> Result<Self, DualplexError> {
        Ok(Self {
            pool: build_pool(num_threads)?,
        })
    }
}

impl Pricing for TaskPricing {
    fn choose_row(&self, work: &WorkArrays, weights: &[f64], tol: f64) -> Option<usize> {
        best_row(work, weights, tol, 0..work.base_value.len()).map(|c| c.position)
    }

    fn price_row(
        &self,
        matrix: &Matrix,
        row_ep: &nalgebra::DVector<f64>,
        nonbasic_flag: &[bool],
        row_ap: &mut [f64],
    ) {
        //sparse rows are cheap enough to price serially
        if matrix.price_by_row_preferred(row_ep) {
            matrix.price_by_row(row_ep, row_ap);
            return;
        }

        let chunk = chunk_size(row_ap.len(), self.pool.current_num_threads());

        self.pool.install(|| {
            row_ap
                .par_chunks_mut(chunk)
                .enumerate()
                .for_each(|(c, out)| {
                    let start = c * chunk;
                    matrix.price_column_range(row_ep, nonbasic_flag, start..start + out.len(), out);
                })
        });
    }

    fn collect_candidates(
        &self,
        num_var: usize,
        candidate: &(dyn Fn(usize) -> Option<Candidate> + Sync),
    ) -> Vec<Candidate> {
        let chunk = chunk_size(num_var, self.pool.current_num_threads());
        let num_chunks = (num_var + chunk - 1) / chunk;

        let chunks: Vec<Vec<Candidate>> = self.pool.install(|| {
            (0..num_chunks)
                .into_par_iter()
                .map(|c| {
                    (c * chunk..((c + 1) * chunk).min(num_var))
                        .filter_map(|var| candidate(var))
                        .collect()
                })
                .collect()
        });

        chunks.into_iter().flatten().collect()
    }
}

fn build_pool(num_threads: usize) -> Result<rayon::ThreadPool, DualplexError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|err| DualplexError::InvalidOption(format!("cannot build thread pool: {}", err)))
}

pub fn pricing_for(options: &SimplexOptions) -> Result<Box<dyn Pricing>, DualplexError> {
    Ok(match options.strategy {
        SimplexStrategy::Serial => Box::new(SerialPricing::default()),
        SimplexStrategy::Tasks => Box::new(TaskPricing::new(options.num_threads)?),
        SimplexStrategy::Multi => Box::new(MultiChunkPricing::new(options.num_threads)?),
    })
}
