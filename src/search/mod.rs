pub mod grid;
pub mod runner;
pub mod sink;
