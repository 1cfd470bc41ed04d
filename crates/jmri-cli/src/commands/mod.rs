//! Command implementations for jmri-cli

pub mod demo;
pub mod reporters;
pub mod train;

pub use demo::demo;
pub use reporters::{reporter, reporters};
pub use train::run_train;
