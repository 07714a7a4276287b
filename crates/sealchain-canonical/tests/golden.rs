//! Golden byte-for-byte fixtures for the canonical encoding.
//!
//! Cross-implementation determinism hangs on these exact strings; any change
//! here is a wire-format break, not a refactor.

use sealchain_canonical::{content_hash, to_canonical_json, ContentHash, HASH_PREFIX};
use serde_json::json;

#[test]
fn object_keys_sort_to_golden_text() {
    let value = json!({"z": 1, "a": 2, "m": 3});
    assert_eq!(to_canonical_json(&value), r#"{"a":2,"m":3,"z":1}"#);
}

#[test]
fn nested_structure_golden_text() {
    let value = json!({
        "items": [{"id": "i1"}, {"id": "i2"}],
        "count": 2,
        "active": true,
        "note": null
    });
    assert_eq!(
        to_canonical_json(&value),
        r#"{"active":true,"count":2,"items":[{"id":"i1"},{"id":"i2"}],"note":null}"#
    );
}

#[test]
fn numeric_fixture_set() {
    // Integer renderings: no decimal point, no plus sign, no exponent.
    assert_eq!(to_canonical_json(&json!(0)), "0");
    assert_eq!(to_canonical_json(&json!(-1)), "-1");
    assert_eq!(to_canonical_json(&json!(42u64)), "42");
    assert_eq!(to_canonical_json(&json!(9007199254740991i64)), "9007199254740991");
    assert_eq!(to_canonical_json(&json!(-9007199254740991i64)), "-9007199254740991");

    // Integral floats within the safe range collapse to integers.
    assert_eq!(to_canonical_json(&json!(1.0_f64)), "1");
    assert_eq!(to_canonical_json(&json!(100000.0_f64)), "100000");
    assert_eq!(to_canonical_json(&json!(9007199254740991.0_f64)), "9007199254740991");

    // Negative zero renders as plain zero.
    assert_eq!(to_canonical_json(&json!(-0.0_f64)), "0");

    // Magnitudes past the safe-integer range render in plain decimal,
    // never exponent form, on both sides of the 1e20 boundary.
    assert_eq!(to_canonical_json(&json!(1e19_f64)), "10000000000000000000");
    assert_eq!(to_canonical_json(&json!(1e20_f64)), "100000000000000000000");
    assert_eq!(to_canonical_json(&json!(1e21_f64)), "1000000000000000000000");
    assert_eq!(to_canonical_json(&json!(-1e20_f64)), "-100000000000000000000");

    // Fractional values use the shortest round-tripping decimal form.
    assert_eq!(to_canonical_json(&json!(0.5_f64)), "0.5");
    assert_eq!(to_canonical_json(&json!(-2.75_f64)), "-2.75");
    assert_eq!(to_canonical_json(&json!(0.1_f64)), "0.1");
    assert_eq!(to_canonical_json(&json!(3.141592653589793_f64)), "3.141592653589793");
}

#[test]
fn unicode_keys_sort_by_code_point() {
    // "é" (U+00E9) sorts after every ASCII key.
    let value = json!({"é": 1, "z": 2, "a": 3});
    assert_eq!(to_canonical_json(&value), "{\"a\":3,\"z\":2,\"\u{e9}\":1}");
}

#[test]
fn string_escaping_golden_text() {
    let value = json!({"text": "line1\nline2\ttabbed \"quoted\" back\\slash"});
    assert_eq!(
        to_canonical_json(&value),
        r#"{"text":"line1\nline2\ttabbed \"quoted\" back\\slash"}"#
    );
}

#[test]
fn content_hash_golden_values() {
    // sha256 of the exact canonical text; shared fixtures for other ports.
    assert_eq!(
        content_hash(&json!({"val": 1})).as_str(),
        "sha256:0fad9b1ee80feeacd36fcceb3ce9538cfa66faef5e4b46d045600c0dad487431"
    );
    assert_eq!(
        content_hash(&json!({"z": 1, "a": 2, "m": 3})).as_str(),
        "sha256:ebba85cfdc0a724b6cc327ecc545faeb38b9fe02eca603b430eb872f5cf75370"
    );
}

#[test]
fn content_hash_golden_shape_and_determinism() {
    let value = json!({"val": 1});
    let h1 = content_hash(&value);
    let h2 = content_hash(&value);
    assert_eq!(h1, h2);
    assert!(h1.as_str().starts_with(HASH_PREFIX));
    ContentHash::parse(h1.as_str()).unwrap();
}
