pub mod pipeline;
pub mod requirements;
pub mod solver;
pub mod unit;
pub mod utils;
