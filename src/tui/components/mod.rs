pub mod input;
pub mod list;

pub use input::*;
pub use list::*;
