//! Google Calendar downstream invoker.
//!
//! [`CalendarInvoker`] implements [`ApiInvoker`](crate::ApiInvoker): it
//! spends one [`OutboundToken`](crate::OutboundToken) on one request against
//! the Calendar v3 REST API and hands back the parsed JSON body.

mod client;
mod config;

pub use client::CalendarInvoker;
pub use config::CalendarConfig;
