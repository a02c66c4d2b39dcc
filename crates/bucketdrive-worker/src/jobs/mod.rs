//! Job handler implementations.

pub mod link_sweep;

pub use link_sweep::LinkSweepJobHandler;
