//! User-Agent product token parsing.
//!
//! Only the leading `product/version (comment)` part is interpreted, which is
//! enough to tell command-line clients apart from browsers.

/// Parsed User-Agent header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgent<'a> {
    pub product: &'a str,
    pub version: &'a str,
    pub comment: &'a str,
}

/// Products treated as command-line clients.
pub const CLI_PRODUCTS: &[&str] = &[
    "curl",
    "HTTPie",
    "Wget",
    "fetch libfetch",
    "Go",
    "Go-http-client",
    "ddclient",
];

/// Split a User-Agent value into product, version and comment.
///
/// A version is only recognised when the text after the first `/` starts with
/// a digit; otherwise that text is kept as the comment.
pub fn parse(s: &str) -> UserAgent<'_> {
    match s.split_once('/') {
        Some((product, rest)) => {
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                let (version, comment) = rest.split_once(' ').unwrap_or((rest, ""));
                UserAgent { product, version, comment }
            } else {
                UserAgent { product, version: "", comment: rest }
            }
        }
        None => {
            let (product, comment) = s.split_once(' ').unwrap_or((s, ""));
            UserAgent { product, version: "", comment }
        }
    }
}

impl UserAgent<'_> {
    pub fn is_cli(&self) -> bool {
        CLI_PRODUCTS.contains(&self.product)
    }
}
