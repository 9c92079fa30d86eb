pub mod adjacency;
pub mod correlation;
pub mod counts;
pub mod sensitivity;
pub mod spearman;
pub mod uncertainty;

pub use adjacency::*;
pub use correlation::*;
pub use counts::*;
pub use sensitivity::*;
pub use spearman::*;
pub use uncertainty::*;
