mod app;
pub use app::*;

pub mod floating_score;
pub mod input;
pub mod restart;
