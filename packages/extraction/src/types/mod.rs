//! Data types shared across the pipeline.

pub mod config;
pub mod page;
pub mod request;
pub mod result;
