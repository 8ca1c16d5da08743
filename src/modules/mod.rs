pub(crate) mod config;
pub(crate) mod gif;
pub(crate) mod help;
pub(crate) mod stats;
