mod login;
mod logout;
mod refresh;
mod register;

pub use login::*;
pub use logout::*;
pub use refresh::*;
pub use register::*;
