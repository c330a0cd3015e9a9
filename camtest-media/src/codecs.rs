//! Container/codec negotiation
//!
//! Encoders are probed in a fixed preference order, most specific first.
//! When the host supports none of them the least specific entry is used
//! anyway and the encoder is left to decide.

/// Preference order used when none is configured
pub const DEFAULT_MIME_PREFERENCES: [&str; 3] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
];

/// Default target video bitrate
pub const DEFAULT_VIDEO_BITS_PER_SECOND: u32 = 2_500_000;

/// Owned copy of [`DEFAULT_MIME_PREFERENCES`]
pub fn default_mime_preferences() -> Vec<String> {
    DEFAULT_MIME_PREFERENCES
        .iter()
        .map(|m| m.to_string())
        .collect()
}

/// Pick the first supported MIME type, or the least specific one
///
/// Returns `None` only for an empty preference list.
pub fn negotiate_mime_type<F>(preferences: &[String], is_supported: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    preferences
        .iter()
        .find(|m| is_supported(m))
        .or_else(|| preferences.last())
        .cloned()
}

/// Configurations to try when opening an encoder, in order
///
/// Starts at the negotiated type and continues down the preference list, so
/// an encoder that rejects its configuration degrades to a less specific one.
pub fn degradation_order<F>(preferences: &[String], is_supported: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let Some(negotiated) = negotiate_mime_type(preferences, is_supported) else {
        return Vec::new();
    };
    preferences
        .iter()
        .skip_while(|m| **m != negotiated)
        .cloned()
        .collect()
}

/// Encoder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Container and codec, e.g. `video/webm;codecs=vp8,opus`
    pub mime_type: String,
    /// Target video bitrate
    pub video_bits_per_second: u32,
}

impl EncoderConfig {
    /// Create a configuration for a MIME type at the default bitrate
    pub fn new(mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            video_bits_per_second: DEFAULT_VIDEO_BITS_PER_SECOND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiate_prefers_most_specific() {
        let prefs = default_mime_preferences();
        let negotiated = negotiate_mime_type(&prefs, |_| true);
        assert_eq!(negotiated.as_deref(), Some("video/webm;codecs=vp9,opus"));
    }

    #[test]
    fn test_negotiate_skips_unsupported() {
        let prefs = default_mime_preferences();
        let negotiated = negotiate_mime_type(&prefs, |m| !m.contains("vp9"));
        assert_eq!(negotiated.as_deref(), Some("video/webm;codecs=vp8,opus"));
    }

    #[test]
    fn test_negotiate_falls_back_to_least_specific() {
        let prefs = default_mime_preferences();
        let negotiated = negotiate_mime_type(&prefs, |_| false);
        assert_eq!(negotiated.as_deref(), Some("video/webm"));

        assert_eq!(negotiate_mime_type(&[], |_| true), None);
    }

    #[test]
    fn test_degradation_order() {
        let prefs = default_mime_preferences();

        let order = degradation_order(&prefs, |m| m.contains("vp8"));
        assert_eq!(order, vec!["video/webm;codecs=vp8,opus", "video/webm"]);

        let order = degradation_order(&prefs, |_| false);
        assert_eq!(order, vec!["video/webm"]);

        assert!(degradation_order(&[], |_| true).is_empty());
    }
}
