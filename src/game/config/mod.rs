mod gait_defs;
pub mod parser;

pub use gait_defs::*;
