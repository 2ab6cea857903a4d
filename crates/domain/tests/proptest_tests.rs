//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::value_objects::{ThreadId, VoiceProvider};
use proptest::prelude::*;

// ============================================================================
// ThreadId Property Tests
// ============================================================================

mod thread_id_tests {
    use super::*;

    proptest! {
        #[test]
        fn prefixed_tokens_are_accepted(token in "[A-Za-z0-9_-]{1,40}") {
            let raw = format!("thread_{token}");
            let id = ThreadId::new(raw.clone());
            prop_assert!(id.is_ok());
            let id = id.unwrap();
            prop_assert_eq!(id.as_str(), raw.as_str());
        }

        #[test]
        fn unprefixed_values_are_rejected(value in "[a-su-z0-9]{1,40}") {
            // no leading 't' so the prefix can never match
            prop_assert!(ThreadId::new(value).is_err());
        }

        #[test]
        fn lenient_parse_never_fails(value in ".*") {
            let parsed = ThreadId::parse_lenient(Some(&value));
            if let Some(id) = parsed {
                prop_assert!(id.as_str().starts_with("thread_"));
            }
        }

        #[test]
        fn lenient_parse_agrees_with_strict(value in ".{0,40}") {
            let strict = ThreadId::new(value.clone()).ok();
            let lenient = ThreadId::parse_lenient(Some(&value));
            prop_assert_eq!(strict, lenient);
        }

        #[test]
        fn serde_roundtrip_preserves_value(token in "[A-Za-z0-9]{1,32}") {
            let id = ThreadId::new(format!("thread_{token}")).unwrap();
            let json = serde_json::to_string(&id).unwrap();
            let parsed: ThreadId = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(id, parsed);
        }
    }
}

// ============================================================================
// VoiceProvider Property Tests
// ============================================================================

mod voice_provider_tests {
    use super::*;

    proptest! {
        #[test]
        fn unknown_names_are_rejected(name in "[a-z]{1,12}") {
            prop_assume!(name != "openai" && name != "elevenlabs");
            prop_assert!(name.parse::<VoiceProvider>().is_err());
        }

        #[test]
        fn display_parses_back(idx in 0usize..2) {
            let provider = [VoiceProvider::ElevenLabs, VoiceProvider::OpenAi][idx];
            let parsed: VoiceProvider = provider.to_string().parse().unwrap();
            prop_assert_eq!(parsed, provider);
        }
    }
}
