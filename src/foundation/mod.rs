pub(crate) mod config;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod logging;
pub(crate) mod math;
