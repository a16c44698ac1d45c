pub mod level;
pub mod quiz;
