pub mod borehole;
pub mod history;
pub mod series;

pub use borehole::*;
pub use history::*;
pub use series::*;
