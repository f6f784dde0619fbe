//! Container image reference grammar.
//!
//! `[domain[:port]/]path[/path...][:tag][@digest]` where path components are
//! lowercase alphanumerics joined by `.`, `_`, `__` or runs of `-`.

use std::sync::LazyLock;

use regex::Regex;

const ALPHANUMERIC: &str = "[a-z0-9]+";
const SEPARATOR: &str = "(?:[._]|__|[-]+)";
const DOMAIN_COMPONENT: &str = "(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])";
const TAG: &str = "[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}";
const DIGEST: &str = "[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*[:][0-9A-Fa-f]{32,}";

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let path_component = format!("{ALPHANUMERIC}(?:{SEPARATOR}{ALPHANUMERIC})*");
    let domain = format!(r"{DOMAIN_COMPONENT}(?:\.{DOMAIN_COMPONENT})*(?::[0-9]+)?");
    let name = format!("(?:{domain}/)?{path_component}(?:/{path_component})*");
    let pattern = format!("^{name}(?::{TAG})?(?:@{DIGEST})?$");
    Regex::new(&pattern).expect("image reference pattern is valid")
});

pub fn is_valid_image(image: &str) -> bool {
    REFERENCE.is_match(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_references() {
        for image in [
            "busybox",
            "busybox:1.28",
            "library/busybox:latest",
            "ghcr.io/org/debug-tools:v1.2.3",
            "registry.example.com:5000/team/img_name",
            "nicolaka/netshoot@sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
            "localhost:5000/a/b:tag@sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
        ] {
            assert!(is_valid_image(image), "{image} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_references() {
        for image in [
            "",
            "Busybox",
            "a::b",
            "busybox:",
            "org//img",
            "-busybox",
            "busybox@sha256:short",
            "busy box",
            "busybox:ťag",
            "busybox:1.28_ß",
        ] {
            assert!(!is_valid_image(image), "{image:?} should be invalid");
        }
    }
}
