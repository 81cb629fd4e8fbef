//! DealerDesk: dealership management server
//!
//! A small web application for running a car dealership: a public catalog
//! and financing form, plus an authenticated dashboard for managing the
//! inventory, customers, financing partners and staff accounts.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
