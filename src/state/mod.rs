pub mod fetchers;

pub use fetchers::*;
