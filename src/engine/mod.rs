pub mod calculator;
pub mod external;
pub mod results;
