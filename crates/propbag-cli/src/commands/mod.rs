//! CLI commands.

pub(crate) mod config;
pub(crate) mod props;
pub(crate) mod stock;
