pub mod normalize;
pub mod similarity;

pub use normalize::*;
pub use similarity::*;
