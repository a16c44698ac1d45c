pub mod catalog;
pub mod pool;
pub mod row;

pub use row::Question;
