//! Application services layer: the storage port, derived views, rendering and
//! the post service that ties them together.

pub mod aggregate;
pub mod error;
pub mod posts;
pub mod render;
pub mod store;
