//! lexnav library exports for testing

pub mod cli;
pub mod core;
pub mod error;
pub mod volume;

#[cfg(test)]
pub mod test_support;
