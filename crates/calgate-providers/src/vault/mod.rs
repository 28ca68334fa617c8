//! Token vault exchange client.
//!
//! [`VaultClient`] implements [`TokenExchanger`](crate::TokenExchanger)
//! against a Descope-style outbound-app management API:
//!
//! ```text
//! POST {base}/v1/mgmt/outbound/app/user/token/latest
//! Authorization: Bearer <project id>:<inbound token>
//! {"appId": "<provider app>", "userId": "<subject>"}
//!
//! 200 {"token": {"accessToken": "...", "accessTokenExpiry": 1700000000}}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calgate_providers::vault::{VaultClient, VaultConfig};
//!
//! let config = VaultConfig::new(VaultConfig::DEFAULT_BASE_URL, "P2abc")?;
//! let vault = VaultClient::new(config)?;
//! let token = vault.exchange(&identity, "google-calendar").await?;
//! ```

mod client;
mod config;

pub use client::VaultClient;
pub use config::VaultConfig;
