//! Test utilities & fixtures shared by the integration tests.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging once for the whole test binary. Honors `RUST_LOG`.
#[allow(dead_code)] // Not every test binary uses it.
pub fn init_logging() {
    INIT.call_once(|| mushcore::logutil::init_logging(0));
}
