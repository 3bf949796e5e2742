pub mod base;
pub mod configs;
pub mod openai;
pub mod types;
pub mod utils;
pub mod weather;

#[cfg(test)]
pub mod mock;
