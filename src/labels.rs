use md5::{Digest, Md5};
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_LABEL_LEN: usize = 63;

const LABEL_HASH_LEN: usize = 9;

// Leading and trailing non-alphanumerics, plus any character outside the label alphabet.
static UNSAFE_LABEL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^a-z0-9A-Z]*|[^a-zA-Z0-9_\-\.]|[^a-z0-9A-Z]*$").unwrap()
});

/// Turns `value` into a valid label value: at most `max_length` characters,
/// empty or starting and ending with an alphanumeric, with only `-`, `_`
/// and `.` in between.
///
/// When cleaning changed the input or the result is too long, the result is
/// cut and suffixed with `-` and the first 9 hex digits of the input's MD5,
/// so distinct inputs keep distinct labels.
pub fn make_safe_label_value(value: &str, max_length: usize) -> String {
    let safe_label = UNSAFE_LABEL_CHARS.replace_all(value, "");

    if safe_label.len() <= max_length && safe_label == value {
        return safe_label.into_owned();
    }

    let digest = hex::encode(Md5::digest(value.as_bytes()));
    let safe_hash = &digest[..LABEL_HASH_LEN];
    let keep = max_length
        .saturating_sub(LABEL_HASH_LEN + 1)
        .min(safe_label.len());

    // Only ASCII survives the cleanup, so byte slicing is on char boundaries.
    format!("{}-{}", &safe_label[..keep], safe_hash)
}
