//! Voice mapping between OpenAI voice names and system voices

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// OpenAI voice aliases and the system voice each one maps to
pub const VOICE_ALIASES: [(&str, &str); 6] = [
    ("alloy", "Yue"),
    ("echo", "Ting-Ting"),
    ("fable", "Sin-ji"),
    ("onyx", "Li-mu"),
    ("nova", "Mei-Jia"),
    ("shimmer", "Yu-shu"),
];

/// Map a requested voice to a system voice; unknown names use the default
pub fn resolve_voice<'a>(requested: Option<&str>, default_voice: &'a str) -> &'a str {
    requested
        .and_then(|name| {
            let name = name.trim().to_ascii_lowercase();
            VOICE_ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|(_, voice)| *voice)
        })
        .unwrap_or(default_voice)
}

/// One installed system voice, as listed by `say -v ?`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemVoice {
    pub name: String,
    pub language: String,
    pub description: String,
}

// "Eddy (English (UK)) en_GB    # Hello! My name is Eddy."
static SAY_VOICE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.+?)\s+(?P<lang>[a-z]{2,3}[_-][A-Za-z0-9]{2,4})\s+#\s?(?P<desc>.*)$")
        .expect("Invalid say voice regex")
});

/// Parse the output of `say -v ?`
pub fn parse_say_voices(output: &str) -> Vec<SystemVoice> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            SAY_VOICE_LINE.captures(line).map(|caps| SystemVoice {
                name: caps["name"].trim().to_string(),
                language: caps["lang"].to_string(),
                description: caps["desc"].trim().to_string(),
            })
        })
        .collect()
}
