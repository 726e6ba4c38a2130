//width of the iteration column in the log
pub const ITER_WIDTH: usize = 10;

//entries of a sparse vector below this are dropped
pub const TINY: f64 = 1e-14;

//number of entries of a dense vector that are not (numerically) zero
pub fn count_nonzeros(v: &nalgebra::DVector<f64>) -> usize {
    v.iter().filter(|v_i| v_i.abs() > TINY).count()
}
