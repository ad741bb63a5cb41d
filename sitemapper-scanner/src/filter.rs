use crate::normalize::normalize;
use crate::result::Edge;
use tracing::{debug, warn};

const UNSUPPORTED_SCHEMES: [&str; 4] = ["feed:", "mailto:", "sketch:", "javascript:"];
const UNSUPPORTED_EXTENSIONS: [&str; 3] = [".dmg", ".zip", ".pdf"];

/// Why a discovered href did not become a frontier edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    Fragment,
    UnsupportedScheme,
    UnsupportedFileType,
    Malformed,
    CrossOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admit(Edge),
    Skip(SkipReason),
}

impl Admission {
    pub fn edge(self) -> Option<Edge> {
        match self {
            Admission::Admit(edge) => Some(edge),
            Admission::Skip(_) => None,
        }
    }
}

/// Decide whether `href`, found on `referrer`, should be crawled.
///
/// `origin_domain` is the canonical domain of the crawl origin. Hrefs that
/// start with `/`, `.` or `#` are resolved against `referrer`; anything else
/// is treated as an absolute URL.
pub fn admit(href: &str, referrer: &str, origin_domain: &str, allow_cross_origin: bool) -> Admission {
    if href.is_empty() {
        return Admission::Skip(SkipReason::Empty);
    }
    if href.starts_with('#') {
        return Admission::Skip(SkipReason::Fragment);
    }
    if UNSUPPORTED_SCHEMES.iter().any(|scheme| href.contains(scheme)) {
        return Admission::Skip(SkipReason::UnsupportedScheme);
    }
    if UNSUPPORTED_EXTENSIONS.iter().any(|ext| href.contains(ext)) {
        return Admission::Skip(SkipReason::UnsupportedFileType);
    }

    let relative = href.starts_with(['/', '.', '#']);
    let normalized = if relative {
        normalize(href, referrer)
    } else {
        normalize(href, "")
    };

    let (canonical, fields) = match normalized {
        Ok(normalized) => normalized,
        Err(e) => {
            warn!("Skipping link on {}: {}", referrer, e);
            return Admission::Skip(SkipReason::Malformed);
        }
    };

    if !allow_cross_origin && fields.canonical_domain != origin_domain {
        debug!("Skipping external link: {}", canonical);
        return Admission::Skip(SkipReason::CrossOrigin);
    }

    Admission::Admit(Edge::new(referrer, canonical))
}
