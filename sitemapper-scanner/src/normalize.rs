use crate::error::{Result, ScanError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Protocol assumed for URLs that do not carry one.
pub const DEFAULT_PROTOCOL: &str = "https://";

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<protocol>(?:https?|feed|sketch)://|mailto:|javascript:)?",
        r"(?P<www>www\.)?",
        r"(?P<canonical>(?P<domain>[a-z0-9\-@]+(?:\.[a-z0-9\-]+)*)(?P<tld>\.[a-z]+))?",
        r"(?P<path>/[^?#\s]*)?",
        r"(?P<params>\?[^\s#]*)?",
        r"(?P<search>#.*)?$",
    ))
    .expect("hardcoded URL pattern is valid")
});

/// The pieces of a URL as matched by the URL pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFields {
    pub protocol: String,
    pub www_subdomain: String,
    /// Host plus TLD, without `www.` or protocol. Used for same-site checks.
    pub canonical_domain: String,
    pub domain: String,
    pub tld: String,
    pub path: String,
    pub params: String,
    pub search: String,
    pub canonical_url: String,
}

impl UrlFields {
    /// Parse `url` with the URL pattern. Only the trailing-slash rule is
    /// applied; no defaults are filled in.
    pub fn parse(url: &str) -> Result<Self> {
        let caps = URL_PATTERN
            .captures(url)
            .ok_or_else(|| ScanError::malformed(url))?;
        let group = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        let mut fields = UrlFields {
            protocol: group("protocol"),
            www_subdomain: group("www"),
            canonical_domain: group("canonical"),
            domain: group("domain"),
            tld: group("tld"),
            path: with_trailing_slash(&group("path")),
            params: group("params"),
            search: group("search"),
            canonical_url: String::new(),
        };
        fields.canonical_url = fields.compose();
        Ok(fields)
    }

    fn compose(&self) -> String {
        format!(
            "{}{}{}{}{}{}",
            self.protocol,
            self.www_subdomain,
            self.canonical_domain,
            self.path,
            self.params,
            self.search
        )
    }
}

/// Normalize `url`, resolving it against `referrer` when one is given.
///
/// Returns the canonical URL together with its fields. Relative hrefs such as
/// `../c` are resolved against the referrer's directory; bare paths inherit
/// the referrer's domain. The protocol defaults to `https://`.
pub fn normalize(url: &str, referrer: &str) -> Result<(String, UrlFields)> {
    let base = if referrer.is_empty() {
        None
    } else {
        Some(normalize(referrer, "")?.1)
    };

    let target = base
        .as_ref()
        .and_then(|base| resolve_dot_segments(url, &base.path))
        .unwrap_or_else(|| url.to_string());

    let mut fields = UrlFields::parse(&target).map_err(|_| ScanError::malformed(url))?;

    if fields.protocol.is_empty() {
        fields.protocol = DEFAULT_PROTOCOL.to_string();
    }

    if fields.path.is_empty() {
        fields.path = match &base {
            Some(base) if !base.path.is_empty() => base.path.clone(),
            _ => "/".to_string(),
        };
    }

    if let Some(base) = &base
        && fields.canonical_domain.is_empty()
    {
        fields.canonical_domain = base.canonical_domain.clone();
        fields.domain = base.domain.clone();
        fields.tld = base.tld.clone();
    }

    fields.canonical_url = fields.compose();
    Ok((fields.canonical_url.clone(), fields))
}

fn with_trailing_slash(path: &str) -> String {
    if !path.is_empty() && !path.contains('.') && !path.ends_with('/') {
        format!("{}/", path)
    } else {
        path.to_string()
    }
}

/// Resolve a `./` or `../` prefixed href against the directory of
/// `referrer_path`. Returns `None` for hrefs that are not dot-relative.
fn resolve_dot_segments(href: &str, referrer_path: &str) -> Option<String> {
    let dot_relative =
        href.starts_with("./") || href.starts_with("../") || href == "." || href == "..";
    if !dot_relative {
        return None;
    }

    let mut dir = directory_of(referrer_path);
    let mut rest = href;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
            dir = parent_directory(&dir);
        } else if rest == "." {
            rest = "";
        } else if rest == ".." {
            rest = "";
            dir = parent_directory(&dir);
        } else {
            break;
        }
    }

    Some(format!("{}{}", dir, rest))
}

/// The portion of `path` up to and including its last `/`.
fn directory_of(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

// "/a/b/" -> "/a/", the root stays at "/"
fn parent_directory(dir: &str) -> String {
    directory_of(dir.trim_end_matches('/'))
}
