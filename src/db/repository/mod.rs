pub mod catalog;
pub mod prescription;

pub use catalog::*;
pub use prescription::*;
