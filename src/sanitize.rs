//! Field sanitizers applied to submitted meta values before they are stored.
//!
//! `sanitize_text` produces single-line plain text with all markup removed.
//! `sanitize_url` keeps a raw URL suitable for storage: it drops characters
//! that never belong in a URL and rejects schemes outside `ALLOWED_SCHEMES`,
//! but does not otherwise judge whether the URL is well formed.

use crate::models::meta_field::Sanitizer;
use regex::Regex;
use std::sync::LazyLock;

/// Schemes a stored URL may use. Anything else sanitizes to an empty string.
const ALLOWED_SCHEMES: [&str; 22] = [
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "irc6", "ircs", "gopher", "nntp",
    "feed", "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

/// Encoded line breaks stripped from non-mailto URLs.
const ENCODED_NEWLINES: [&str; 4] = ["%0d", "%0a", "%0D", "%0A"];

// `script` and `style` elements are dropped with their content, but only
// when the element is closed.
static SCRIPT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script(?:[\s/][^>]*)?>.*?</script\s*>").expect("valid script regex")
});
static STYLE_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style(?:[\s/][^>]*)?>.*?</style\s*>").expect("valid style regex")
});
/// A `<` up to the next `<` or `>`. Without the closing `>` it is stray text.
static LESS_THAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>?").expect("valid less-than regex"));
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z/!?][^<>]*>").expect("valid tag regex"));
static CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Cc}&&[^\t\n\r]]").expect("valid control regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid whitespace regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid spaces regex"));
static OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%[a-f0-9]{2}").expect("valid octet regex"));

/// Characters that never belong in a stored URL. Non-ASCII passes through.
static URL_DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[^a-z0-9\-~+_.?#=!&;,/:%@$|*'()\[\]\x{80}-\x{10FFFF}]")
        .expect("valid url character regex")
});
/// `index.php?x=1` style relative links keep their shape.
static PHP_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9-]+?\.php").expect("valid php script regex"));

pub fn sanitize(sanitizer: Sanitizer, value: &str) -> String {
    match sanitizer {
        Sanitizer::PlainText => sanitize_text(value),
        Sanitizer::Url => sanitize_url(value),
    }
}

/// Reduce `input` to plain single-line text.
pub fn sanitize_text(input: &str) -> String {
    let stripped = if input.contains('<') {
        strip_all_tags(&escape_stray_less_than(input))
    } else {
        input.to_string()
    };

    let without_controls = CONTROL.replace_all(&stripped, "");
    let collapsed = WHITESPACE.replace_all(&without_controls, " ");
    let mut text = collapsed.trim().to_string();

    let mut found = false;
    while OCTET.is_match(&text) {
        text = OCTET.replace_all(&text, "").into_owned();
        found = true;
    }
    if found {
        text = SPACES.replace_all(text.trim(), " ").into_owned();
    }
    text
}

/// Clean a URL for storage. Returns an empty string for disallowed schemes.
pub fn sanitize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let spaced = trimmed.replace(' ', "%20");
    let mut url = URL_DISALLOWED.replace_all(&spaced, "").into_owned();
    if url.is_empty() {
        return url;
    }

    if !url.to_ascii_lowercase().starts_with("mailto:") {
        url = deep_replace(url, &ENCODED_NEWLINES);
    }
    url = url.replace(";//", "://");

    if !url.contains(':') && !url.starts_with(['/', '#', '?']) && !PHP_SCRIPT.is_match(&url) {
        url = format!("http://{url}");
    }

    if url.starts_with('/') {
        return url;
    }

    match explicit_scheme(&url) {
        Some(scheme) if !is_allowed_scheme(scheme) => String::new(),
        _ => url,
    }
}

fn is_allowed_scheme(scheme: &str) -> bool {
    let scheme: String = scheme
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    ALLOWED_SCHEMES.contains(&scheme.as_str())
}

/// The text before the first `:`. A head containing `/?` is a path with a
/// query, not a scheme.
fn explicit_scheme(url: &str) -> Option<&str> {
    let (head, _) = url.split_once(':')?;
    if head.contains("/?") { None } else { Some(head) }
}

/// Replace `needles` until none remain, so removal cannot assemble a new match.
fn deep_replace(mut value: String, needles: &[&str]) -> String {
    loop {
        let before = value.len();
        for needle in needles {
            value = value.replace(needle, "");
        }
        if value.len() == before {
            return value;
        }
    }
}

/// Escape every `<` that does not open a complete tag as `&lt;`.
fn escape_stray_less_than(input: &str) -> String {
    LESS_THAN
        .replace_all(input, |caps: &regex::Captures| {
            let matched = &caps[0];
            if matched.ends_with('>') {
                matched.to_string()
            } else {
                format!("&lt;{}", &matched[1..])
            }
        })
        .into_owned()
}

/// Drop closed `script` and `style` elements with their content, then every
/// remaining tag.
fn strip_all_tags(input: &str) -> String {
    let without_scripts = SCRIPT_ELEMENT.replace_all(input, "");
    let without_styles = STYLE_ELEMENT.replace_all(&without_scripts, "");
    TAG.replace_all(&without_styles, "").into_owned()
}
