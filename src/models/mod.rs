pub mod mor;
pub mod occurrence;
pub mod utterance;

pub use mor::*;
pub use occurrence::*;
pub use utterance::*;
