//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

pub mod clock;
pub mod email;
pub mod fixtures;
pub mod memory;

pub use clock::MutableClock;
pub use email::RecordingEmailSender;
pub use memory::{InMemoryStore, RecordedReminder};
