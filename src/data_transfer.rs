pub mod connection_resolver;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod normalizer;
pub mod sink;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;
