//! Subdomain fragment <-> fully-qualified name conversion
//!
//! The registrar always reports a record's fully-qualified name
//! (`www.example.com`, or `example.com` for the apex) while declared state
//! uses the fragment relative to the zone (`www`, or `""`). Reconciliation
//! only ever compares fragments, so every name read back from the remote
//! side goes through [`to_relative`] first.

/// Convert a fully-qualified name to the fragment relative to `domain`.
///
/// - `full_name == domain` yields `""` (apex).
/// - A name ending in `"." + domain` has exactly that suffix removed, so
///   fragments that contain dots themselves (`a.b`) survive intact.
/// - Anything else does not belong to `domain` and is returned unchanged.
pub fn to_relative(domain: &str, full_name: &str) -> String {
    if full_name == domain {
        return String::new();
    }

    match full_name
        .strip_suffix(domain)
        .and_then(|head| head.strip_suffix('.'))
    {
        Some(fragment) => fragment.to_string(),
        None => {
            tracing::debug!(
                "Name {} is outside domain {}; keeping it unchanged",
                full_name,
                domain
            );
            full_name.to_string()
        }
    }
}

/// Convert a fragment relative to `domain` into a fully-qualified name.
pub fn to_absolute(domain: &str, fragment: &str) -> String {
    if fragment.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", fragment, domain)
    }
}

/// True when `full_name` is `domain` itself or lies underneath it
pub fn belongs_to(domain: &str, full_name: &str) -> bool {
    full_name == domain || to_relative(domain, full_name) != full_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apex() {
        assert_eq!(to_relative("example.com", "example.com"), "");
        assert_eq!(to_absolute("example.com", ""), "example.com");
    }

    #[test]
    fn test_simple_subdomain() {
        assert_eq!(to_relative("example.com", "www.example.com"), "www");
        assert_eq!(to_absolute("example.com", "www"), "www.example.com");
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(to_relative("example.com", "*.example.com"), "*");
    }

    #[test]
    fn test_dotted_fragment() {
        assert_eq!(to_relative("example.com", "a.b.example.com"), "a.b");
        assert_eq!(to_relative("example.com", "_dmarc.mail.example.com"), "_dmarc.mail");
    }

    #[test]
    fn test_foreign_name_unchanged() {
        assert_eq!(to_relative("example.com", "other.org"), "other.org");
        assert!(!belongs_to("example.com", "other.org"));
    }

    #[test]
    fn test_suffix_without_label_boundary() {
        // "notexample.com" ends with "example.com" but is a different zone
        assert_eq!(to_relative("example.com", "notexample.com"), "notexample.com");
        assert_eq!(to_relative("example.com", "www.notexample.com"), "www.notexample.com");
    }

    #[test]
    fn test_bare_dot_prefix_strips_to_empty() {
        assert_eq!(to_relative("example.com", ".example.com"), "");
    }

    #[test]
    fn test_round_trip() {
        let domain = "example.co.uk";
        for fragment in ["", "www", "*", "a.b.c", "_acme-challenge", "mail-01"] {
            let full = to_absolute(domain, fragment);
            assert_eq!(to_relative(domain, &full), fragment, "fragment {:?}", fragment);
            assert!(belongs_to(domain, &full));
        }
    }
}
