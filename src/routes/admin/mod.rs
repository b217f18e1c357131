mod dashboard;
mod deliveries;
mod orders;
mod restaurants;
mod users;

pub use dashboard::*;
pub use deliveries::*;
pub use orders::*;
pub use restaurants::*;
pub use users::*;
