pub mod cargo;
pub mod utils;

pub use regex;
pub use utils::*;
