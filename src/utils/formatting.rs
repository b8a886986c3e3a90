use sha2::{Digest, Sha256};

/// Capitalises the first letter of every word and lowercases the rest,
/// collapsing runs of whitespace: `"aNA  maria"` becomes `"Ana Maria"`.
pub fn format_display_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Store key for the email uniqueness index. Hashing keeps arbitrary
/// address characters out of store paths.
pub fn email_index_key(email: &str) -> String {
    hex::encode(Sha256::digest(normalize_email(email).as_bytes()))
}
