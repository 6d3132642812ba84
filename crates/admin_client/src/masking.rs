/// Render a secret for logs: the last four characters survive, the rest is
/// replaced. Short secrets are hidden entirely.
pub fn mask_token(token: &str) -> String {
    let visible = 4;
    let length = token.chars().count();
    if length <= visible * 2 {
        return "[MASKED]".to_string();
    }

    let tail: String = token.chars().skip(length - visible).collect();
    format!("[MASKED]…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token_keeps_only_the_tail() {
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "[MASKED]…load");
    }

    #[test]
    fn test_mask_token_hides_short_secrets() {
        assert_eq!(mask_token("abc"), "[MASKED]");
        assert_eq!(mask_token(""), "[MASKED]");
    }
}
