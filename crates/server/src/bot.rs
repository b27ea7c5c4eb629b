//! `User-Agent` heuristic for automated clients.
//!
//! Link-preview fetchers, crawlers, and HTTP tooling routinely fetch a shared
//! URL before the intended reader does. For burn-on-read secrets that first
//! fetch would destroy the secret, so consumption refuses callers whose
//! declared identity looks automated.
//!
//! # Not a security control
//!
//! This is best effort. Any client can send a browser `User-Agent` and pass.
//! It only reduces accidental burns by well-behaved automation. Do not rely on
//! it to keep a secret from anyone.

/// How a signature is matched against the lowercased `User-Agent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signature {
    /// Substring anywhere.
    Contains(&'static str),
    /// Whole word, bounded by non-word characters or the string edges.
    Word(&'static str),
    /// At the start of the string.
    Prefix(&'static str),
    /// At the start of the string and followed by an ASCII digit.
    VersionedPrefix(&'static str),
}

const SIGNATURES: &[Signature] = &[
    // Search engines
    Signature::Contains("googlebot"),
    Signature::Contains("bingbot"),
    Signature::Contains("slurp"),
    Signature::Contains("duckduckbot"),
    Signature::Contains("baiduspider"),
    Signature::Contains("yandexbot"),
    Signature::Contains("sogou"),
    Signature::Contains("exabot"),
    Signature::Contains("facebot"),
    Signature::Contains("ia_archiver"),
    Signature::Contains("applebot"),
    // Social and chat link previews
    Signature::Contains("facebookexternalhit"),
    Signature::Contains("twitterbot"),
    Signature::Contains("linkedinbot"),
    Signature::Contains("whatsapp"),
    Signature::Contains("telegrambot"),
    Signature::Contains("slackbot"),
    Signature::Contains("discordbot"),
    // Generic terms
    Signature::Word("bot"),
    Signature::Word("crawler"),
    Signature::Word("spider"),
    Signature::Word("scraper"),
    // HTTP libraries and tools
    Signature::Prefix("curl/"),
    Signature::Prefix("wget"),
    Signature::Contains("python-requests"),
    Signature::Contains("go-http-client"),
    Signature::VersionedPrefix("java/"),
    Signature::Contains("node-fetch"),
    Signature::Prefix("axios/"),
    Signature::Prefix("postman"),
    Signature::Prefix("insomnia"),
    Signature::Prefix("httpie"),
    Signature::Contains("okhttp"),
    Signature::Prefix("apache-httpclient"),
    Signature::VersionedPrefix("nginx/"),
    // Uptime and monitoring
    Signature::Contains("uptime"),
    Signature::Contains("pingdom"),
    Signature::Contains("newrelic"),
    Signature::Contains("datadog"),
    Signature::Contains("sentry"),
];

impl Signature {
    fn pattern(self) -> &'static str {
        match self {
            Signature::Contains(p)
            | Signature::Word(p)
            | Signature::Prefix(p)
            | Signature::VersionedPrefix(p) => p,
        }
    }

    fn matches(self, ua: &str) -> bool {
        match self {
            Signature::Contains(p) => ua.contains(p),
            Signature::Word(w) => contains_word(ua, w),
            Signature::Prefix(p) => ua.starts_with(p),
            Signature::VersionedPrefix(p) => ua
                .strip_prefix(p)
                .and_then(|rest| rest.bytes().next())
                .is_some_and(|b| b.is_ascii_digit()),
        }
    }
}

/// Result of classifying a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No signature matched.
    Interactive,
    /// No `User-Agent` was sent, or it was blank.
    Missing,
    /// The named signature matched.
    Automated(&'static str),
}

impl Classification {
    /// Returns `true` for anything other than [`Classification::Interactive`].
    pub fn is_automated(self) -> bool {
        !matches!(self, Classification::Interactive)
    }
}

/// Classify a caller by its declared `User-Agent`.
///
/// Total and side-effect free. A missing identity is treated as automated.
pub fn classify(user_agent: Option<&str>) -> Classification {
    let ua = match user_agent.map(str::trim) {
        None | Some("") => return Classification::Missing,
        Some(ua) => ua.to_ascii_lowercase(),
    };
    SIGNATURES
        .iter()
        .find(|sig| sig.matches(&ua))
        .map_or(Classification::Interactive, |sig| {
            Classification::Automated(sig.pattern())
        })
}

/// Returns `true` if the caller should be refused burn-on-read access.
pub fn is_automated_client(user_agent: Option<&str>) -> bool {
    classify(user_agent).is_automated()
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn contains_word(haystack: &str, word: &str) -> bool {
    let bytes = haystack.as_bytes();
    haystack.match_indices(word).any(|(start, _)| {
        let end = start + word.len();
        let left_ok = start == 0 || !is_word_byte(bytes[start - 1]);
        let right_ok = end == bytes.len() || !is_word_byte(bytes[end]);
        left_ok && right_ok
    })
}
