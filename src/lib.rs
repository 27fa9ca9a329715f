//! hookwatch - delivery and connectivity monitoring for a webhook endpoint
//!
//! The [`ledger`] records every call made to the endpoint and derives rolling
//! reliability statistics; the [`health`] prober keeps those statistics honest
//! during idle periods. [`dispatch`] and [`webhook`] are the caller side.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod ledger;
pub mod logging;
pub mod webhook;
