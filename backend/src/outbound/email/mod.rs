//! Email outbound adapters.
//!
//! [`ResendEmailSender`] delivers through the Resend HTTP API. Without an API
//! key the service falls back to [`LogOnlyEmailSender`].

mod log_only;
mod resend;

pub use log_only::LogOnlyEmailSender;
pub use resend::{RESEND_API_URL, ResendEmailSender};
