pub mod handler;
pub mod output;

pub use handler::*;
pub use output::*;
