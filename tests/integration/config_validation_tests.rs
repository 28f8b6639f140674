//! Configuration loading and validation tests

#[cfg(test)]
mod tests {
    use mini_ai_gateway::{Config, GatewayError};
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, GatewayError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = crate::assert_ok!(load(&[]));

        assert_eq!(config.server.port, 3000);
        assert!(!config.auth.key_required);
        assert_eq!(config.upstream.base_url, "http://127.0.0.1:1234");
        assert!(!config.images.enabled);
        assert!(!config.outbound_proxy.enabled);
    }

    #[test]
    fn test_full_environment_is_applied() {
        let config = crate::assert_ok!(load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("API_KEY_REQUIRED", "true"),
            ("API_KEY", "k"),
            ("TTS_VOICE", "Tingting"),
            ("STT_LANGUAGE", "en"),
            ("LMSTUDIO_BASE_URL", "http://10.0.0.5:1234"),
            ("LMSTUDIO_API_KEY", "lm"),
            ("DRAW_THINGS_ENABLED", "1"),
        ]));

        assert_eq!(config.server.address(), "127.0.0.1:8080");
        assert!(config.auth.key_required);
        assert_eq!(config.speech.default_voice, "Tingting");
        assert_eq!(config.transcription.language, "en");
        assert_eq!(config.upstream.api_key.as_deref(), Some("lm"));
        assert!(config.images.enabled);
    }

    #[test]
    fn test_required_key_without_value_fails() {
        let err = crate::assert_err!(load(&[("API_KEY_REQUIRED", "true")]));
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_malformed_values_fail() {
        for pairs in [
            [("PORT", "eighty")],
            [("LMSTUDIO_BASE_URL", "ftp://example.com")],
            [("LMSTUDIO_BASE_URL", "not a url")],
            [("STT_MAX_UPLOAD_BYTES", "0")],
        ] {
            let err = crate::assert_err!(load(&pairs));
            assert!(
                matches!(err, GatewayError::Config(_)),
                "{:?} should be a configuration error, got {:?}",
                pairs,
                err
            );
        }
    }
}
