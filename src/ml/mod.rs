//! Integration with the external forecasting script and the CSV files it
//! leaves behind.

pub mod alerts;
pub mod outputs;
pub mod runner;
pub mod series;

pub use alerts::*;
pub use outputs::*;
pub use runner::*;
pub use series::*;
