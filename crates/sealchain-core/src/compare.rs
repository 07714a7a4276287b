//! Constant-time comparison for hash material.

use subtle::ConstantTimeEq;

/// Compares two hash strings without leaking where they first differ.
///
/// Lengths are compared first and a mismatch short-circuits to "not equal";
/// the byte comparison itself is constant-time. Use this for every
/// comparison over attacker-influenceable hash or MAC material.
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_compare_equal() {
        assert!(constant_time_str_eq("sha256:abcd", "sha256:abcd"));
        assert!(constant_time_str_eq("", ""));
    }

    #[test]
    fn different_strings_compare_unequal() {
        assert!(!constant_time_str_eq("sha256:abcd", "sha256:abce"));
        assert!(!constant_time_str_eq("short", "longer string"));
    }
}
