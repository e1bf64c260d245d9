//! End-to-end tests for sheetfill-xlsx.
//!
//! Fixtures are built in memory with `XlsxWriter` (or assembled entry by
//! entry with `zip` where a test needs parts the writer never emits), saved
//! to a temp directory, then read back with `XlsxReader`.

mod common;
mod patching;
mod roundtrip;

pub use common::*;
