//! Test metadata annotation
//!
//! Suites declare reporting metadata on their tests by wrapping the test
//! function in [`annotated`] (or the [`annotate!`] macro, which captures the
//! source file and function name). Registration is a side effect of the
//! wrap itself, so it happens while the suite is being set up, not when the
//! test runs, and the callable is returned unchanged: return values and
//! async-ness pass straight through.

use crate::registry;
use crate::types::{TestKey, TestMetadata};

/// Register `metadata` for `(source_path, test_name)` and hand back `f`
/// untouched. Works for plain fns, closures, and async fns alike.
pub fn annotated<F>(source_path: &str, test_name: &str, metadata: TestMetadata, f: F) -> F {
    registry::global().register(TestKey::new(source_path, test_name), metadata);
    f
}

/// Annotate a test function in place, capturing `file!()` as the source
/// path:
///
/// ```ignore
/// let login = annotate!(
///     test_login,
///     description: "Login with a valid TOTP code",
///     expected: "Session cookie issued, 200 OK",
///     module: "Auth",
///     id: "AUTH-001",
/// );
/// ```
#[macro_export]
macro_rules! annotate {
    (
        $test:expr,
        description: $description:expr,
        expected: $expected:expr,
        module: $module:expr,
        id: $id:expr $(,)?
    ) => {
        $crate::annotate::annotated(
            file!(),
            stringify!($test),
            $crate::types::TestMetadata::new($description, $expected, $module, $id),
            $test,
        )
    };
}
