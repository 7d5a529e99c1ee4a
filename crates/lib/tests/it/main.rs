/*! Integration tests for Rowset.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - construction: Recursive conversion, validation, and metadata defaults
 * - encoding: Leaf reads under raw and safe-for-embedding modes
 * - sentinel: Missing-element delegation and chainability
 * - transform: The transformation operations and their shape guards
 * - load: The lazy relation loader contract
 * - serialization: Raw projection, round-trip law, and JSON output shape
 * - diag: The structured diagnostics channel
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("rowset=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod construction;
mod encoding;
mod helpers;
mod load;
mod sentinel;
mod serialization;
