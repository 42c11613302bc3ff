pub mod rebalance;
pub mod views;

pub use rebalance::*;
pub use views::*;
