mod assign;
mod get;
mod status;

pub use assign::*;
pub use get::*;
pub use status::*;
