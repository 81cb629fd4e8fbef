//! HTTP API for the catalog site and the admin dashboard

pub mod auth;
pub mod cars;
pub mod customers;
pub mod financing;
pub mod server;
pub mod uploads;
pub mod users;

pub use server::{create_router, run_server, AppState};

use serde::Serialize;

/// Uniform JSON envelope for API responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
