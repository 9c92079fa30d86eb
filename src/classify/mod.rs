pub mod classifier;
pub mod compounds;

pub use classifier::*;
pub use compounds::*;
