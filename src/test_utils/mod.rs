//! Test utilities
//!
//! Feed fixtures and a scripted `FeedSource` shared by unit tests.

pub mod fixtures;
pub mod mocks;
