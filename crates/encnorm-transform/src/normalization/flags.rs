//! Tri-state decoding of textual flag columns.

use encnorm_model::FlagTokens;

/// Decode a flag cell by exact token match.
///
/// The true token maps to `Some(true)`, the false token to `Some(false)` and
/// everything else, absent included, to `None`. Case and spelling variants are
/// deliberately not recognized.
pub fn decode_flag(raw: Option<&str>, tokens: &FlagTokens) -> Option<bool> {
    match raw {
        Some(value) if value == tokens.true_token => Some(true),
        Some(value) if value == tokens.false_token => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_flag_is_exact_match() {
        let tokens = FlagTokens::new("Ch", "No");
        assert_eq!(decode_flag(Some("Ch"), &tokens), Some(true));
        assert_eq!(decode_flag(Some("No"), &tokens), Some(false));
        assert_eq!(decode_flag(Some("Unknown"), &tokens), None);
        assert_eq!(decode_flag(Some("ch"), &tokens), None);
        assert_eq!(decode_flag(Some("no"), &tokens), None);
        assert_eq!(decode_flag(None, &tokens), None);
    }

    #[test]
    fn medication_flag_uses_its_own_tokens() {
        let tokens = FlagTokens::new("Yes", "No");
        assert_eq!(decode_flag(Some("Yes"), &tokens), Some(true));
        assert_eq!(decode_flag(Some("Ch"), &tokens), None);
        assert_eq!(decode_flag(Some("Y"), &tokens), None);
    }
}
