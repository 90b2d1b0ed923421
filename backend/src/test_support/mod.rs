//! Helpers shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature so the
//! `tests/` suites can build fixtures against the public API.

mod clock;
mod fixtures;

pub use clock::MutableClock;
pub use fixtures::{fixed_now, sample_email, sample_user, sample_username};
