//! Browser header profile.
//!
//! The upstream fingerprints clients, so these values track a real Chrome
//! release and need bumping together when the profile goes stale.

/// Identifier of the browser release the values below were captured from
pub const BROWSER_PROFILE: &str = "chrome-138-windows";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

// Limited to the codings the HTTP client can decode.
pub const ACCEPT_ENCODING: &str = "gzip, deflate, br";

pub const SEC_CH_UA: &str = r#""Not)A;Brand";v="8", "Chromium";v="138", "Google Chrome";v="138""#;

pub const SEC_CH_UA_MOBILE: &str = "?0";

pub const SEC_CH_UA_PLATFORM: &str = r#""Windows""#;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Headers sent on every request unless the request overrides them
pub fn browser_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("User-Agent", USER_AGENT),
        ("Accept", ACCEPT),
        ("Accept-Language", ACCEPT_LANGUAGE),
        ("Accept-Encoding", ACCEPT_ENCODING),
        ("Sec-Ch-Ua", SEC_CH_UA),
        ("Sec-Ch-Ua-Mobile", SEC_CH_UA_MOBILE),
        ("Sec-Ch-Ua-Platform", SEC_CH_UA_PLATFORM),
    ]
}
