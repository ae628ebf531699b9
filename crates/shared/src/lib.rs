pub mod catalog;
pub mod exchange;
pub mod interaction;
pub mod markers;
pub mod models;
pub mod placement;
pub mod session;
pub mod snapshot;
pub mod transform;
pub mod viewport;
