// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP listener configuration

use std::env;
use std::net::SocketAddr;

/// Route the Functions host forwards the HTTP trigger to
pub const DEFAULT_FUNCTION_ROUTE: &str = "/api/lucent";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path serving the detection function
    pub function_route: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// When running as an Azure Functions custom handler the host supplies
    /// `FUNCTIONS_CUSTOMHANDLER_PORT`; it wins over `API_PORT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("FUNCTIONS_CUSTOMHANDLER_PORT")
            .and_then(|v| v.parse().ok())
            .or_else(|| lookup("API_PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        Self {
            host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            function_route: lookup("FUNCTION_ROUTE")
                .unwrap_or_else(|| DEFAULT_FUNCTION_ROUTE.to_string()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.function_route.starts_with('/') {
            return Err(format!(
                "Function route must start with '/', got '{}'",
                self.function_route
            ));
        }
        if self.function_route == "/health" {
            return Err("Function route cannot be /health".to_string());
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid listen address {}:{}: {}", self.host, self.port, e))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            function_route: DEFAULT_FUNCTION_ROUTE.to_string(),
        }
    }
}
