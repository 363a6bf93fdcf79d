//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`]. Scheduled jobs arrive over HTTP too,
//! through the bearer-protected `/cron` endpoints.

pub mod http;
