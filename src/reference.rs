use rand::RngExt;
use rand::distr::Alphanumeric;

/// Reference length used by the service's own tooling.
pub const DEFAULT_REFERENCE_LENGTH: usize = 10;

/// Generate a random alphanumeric transaction reference.
///
/// References correlate an initiation call with later status checks; the
/// service accepts any non-blank string, so callers may supply their own
/// identifiers instead.
pub fn generate_reference(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
