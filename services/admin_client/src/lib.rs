pub mod adapters;
pub mod config;
pub mod error;
pub mod ui;

#[cfg(test)]
mod test_support;
