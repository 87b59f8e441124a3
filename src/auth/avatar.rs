use sha2::{Digest, Sha256};

/// Gravatar URL for an email address: a pure function of the trimmed,
/// lowercased address with fixed size/rating/default parameters.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let mut hex = String::with_capacity(64);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    format!("https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm", hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_email() {
        assert_eq!(gravatar_url("alice@x.com"), gravatar_url("alice@x.com"));
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(gravatar_url("Alice@X.com "), gravatar_url("alice@x.com"));
    }

    #[test]
    fn carries_fixed_parameters() {
        let url = gravatar_url("alice@x.com");
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?s=200&r=pg&d=mm"));
    }

    #[test]
    fn distinct_emails_get_distinct_urls() {
        assert_ne!(gravatar_url("alice@x.com"), gravatar_url("bob@x.com"));
    }
}
