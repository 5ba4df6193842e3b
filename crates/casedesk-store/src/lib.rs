pub mod alias;
pub mod config;
pub mod dataset;
pub mod desk;
pub mod error;
pub mod index;
pub mod outcome;
pub mod scoring;

pub use alias::*;
pub use config::*;
pub use dataset::*;
pub use desk::*;
pub use error::*;
pub use index::*;
pub use outcome::*;
pub use scoring::*;
