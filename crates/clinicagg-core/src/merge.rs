//! Splices per-provider JSON array payloads into a single array.
//!
//! Every provider answers with one top-level JSON array. Rather than parse
//! each payload, the bodies are concatenated in source order and the seams
//! between them are rewritten textually:
//!
//! ```text
//! [{"a":1}]      +  [{"b":2}]   ->  [{"a":1}][{"b":2}]  ->  [{"a":1},{"b":2}]
//! ```
//!
//! # Assumptions
//!
//! This is a text heuristic, not a structural merge. It holds only while
//! each payload is a single well-formed array and no string value contains
//! one of the seam patterns (`][`, `] [`, `]\n[`). A payload that breaks
//! the assumption yields bytes that do not parse, which the normaliser
//! reports as an empty collection.

/// Seams between a closing and an opening bracket, in replacement order.
const SEAMS: [&[u8]; 3] = [b"][", b"] [", b"]\n["];

/// Merge raw array fragments, in the order given, into one JSON array.
///
/// Fragments are trimmed of surrounding whitespace. Blank fragments and
/// empty arrays contribute nothing. If nothing contributes, the result is
/// `[]`.
pub fn merge_fragments<B: AsRef<[u8]>>(fragments: &[B]) -> Vec<u8> {
    let mut merged = Vec::with_capacity(fragments.iter().map(|f| f.as_ref().len()).sum());
    for fragment in fragments {
        let fragment = fragment.as_ref().trim_ascii();
        if fragment.is_empty() || is_empty_array(fragment) {
            continue;
        }
        merged.extend_from_slice(fragment);
    }

    if merged.is_empty() {
        return b"[]".to_vec();
    }

    for seam in SEAMS {
        merged = replace_all(&merged, seam, b",");
    }
    merged
}

fn is_empty_array(fragment: &[u8]) -> bool {
    match fragment {
        [b'[', inner @ .., b']'] => inner.trim_ascii().is_empty(),
        _ => false,
    }
}

fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}
