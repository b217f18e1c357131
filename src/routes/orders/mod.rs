mod get;
mod post;
mod status;

pub use get::*;
pub use post::*;
pub use status::*;
