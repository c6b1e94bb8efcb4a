/*! Integration tests for idmap.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - identity: Tests for the identity algebra and id determinism
 * - closure: Tests for function application, binding and memoization
 * - map: Tests for building, merging and reading frozen maps
 * - expand: Tests for multi-output expansion
 * - pipeline: Tests for pipeline composition, sampling and solving
 * - store: Tests for caching, saving and loading maps
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("idmap=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod closure;
mod expand;
mod helpers;
mod identity;
mod map;
mod pipeline;
