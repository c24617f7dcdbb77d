//! Request signing for the search endpoints
//!
//! The service authorizes each listing call with a rolling 31x string hash
//! computed in 32-bit two's-complement arithmetic. The backend compares the
//! decimal rendering verbatim, so every step must wrap exactly like a
//! signed 32-bit integer.

/// Seed used for the zone-names and fix listing calls
pub const LISTING_SEED: i32 = 42;

/// Seed the bulk availability check validates against
pub const BULK_CHECK_SEED: i32 = 27;

/// Compute the authorization hash of `input` starting from `seed`.
///
/// Character codes are UTF-16 code units, matching what a browser feeds the
/// same routine. Outside the BMP this differs from hashing code points: a
/// surrogate pair contributes two steps, not one. An empty input returns
/// the seed unchanged.
pub fn hash(input: &str, seed: i32) -> String {
    let value = input.encode_utf16().fold(seed, |acc, code| {
        acc.wrapping_shl(5)
            .wrapping_sub(acc)
            .wrapping_add(i32::from(code))
    });
    value.to_string()
}

/// Label, seed and derived hash for one signed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestParams {
    pub label: String,
    pub seed: i32,
    pub hash: String,
}

impl SignedRequestParams {
    pub fn new(label: impl Into<String>, seed: i32) -> Self {
        let label = label.into();
        let hash = hash(&label, seed);
        Self { label, seed, hash }
    }

    /// Params for zone-names and fix lookups
    pub fn listing(label: impl Into<String>) -> Self {
        Self::new(label, LISTING_SEED)
    }

    /// Params for the bulk availability check
    pub fn bulk_check(label: impl Into<String>) -> Self {
        Self::new(label, BULK_CHECK_SEED)
    }
}
