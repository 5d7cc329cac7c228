//! Input predicates for the proposal forms.
//!
//! Token counts are whole units only, so there is no sign, decimal point or
//! exponent to accept.

/// Length of an address string: `0x` followed by 40 hex digits.
pub const ADDRESS_STR_LEN: usize = 42;

/// True iff `input` is non-empty and made only of ASCII digits.
pub fn is_numeric(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
}

/// True iff `input` is `0x` followed by exactly 40 hex digits (either case).
/// No checksum validation.
pub fn is_address(input: &str) -> bool {
    input.len() == ADDRESS_STR_LEN
        && input.starts_with("0x")
        && input[2..].bytes().all(|b| b.is_ascii_hexdigit())
}
