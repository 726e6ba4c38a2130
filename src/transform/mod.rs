pub mod permute;
pub mod scale;
pub mod tighten;
pub mod transpose;

pub use permute::Permutation;
pub use scale::Scale;
pub use tighten::tighten_bounds;
pub use transpose::Transposition;
