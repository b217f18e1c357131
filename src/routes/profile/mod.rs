mod get;
mod password;
mod update;

pub use get::*;
pub use password::*;
pub use update::*;
