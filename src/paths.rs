// src/paths.rs
// =============================================================================
// Small helpers for looking at the path part of a URL.
//
// The worker treats two kinds of URL differently:
// - Directory-style URLs (path ends in '/') are spidered
// - Leaf-style URLs (anything else) get extensions appended and are mangled
// =============================================================================

use url::Url;

// True when the URL path ends in '/' (e.g. http://x/admin/)
pub fn url_is_dir(url: &Url) -> bool {
    url.path().ends_with('/')
}

// True when the last path segment carries a '.' (e.g. /index.php, /.htaccess)
pub fn url_has_extension(url: &Url) -> bool {
    let path = url.path();
    let basename = match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    };
    basename.contains('.')
}

// Splits a URL path into (directory, basename) at the last '/'
//
// Returns None when the path has no '/' at all (e.g. "mailto:admin"),
// which means there is no file name we could swap out.
pub fn split_basename(url: &Url) -> Option<(&str, &str)> {
    let path = url.path();
    path.rfind('/').map(|pos| (&path[..pos], &path[pos + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_url_is_dir() {
        assert!(url_is_dir(&url("http://x/")));
        assert!(url_is_dir(&url("http://x/admin/")));
        assert!(!url_is_dir(&url("http://x/admin")));
    }

    #[test]
    fn test_url_has_extension() {
        assert!(url_has_extension(&url("http://x/index.php")));
        assert!(url_has_extension(&url("http://x/.htaccess")));
        assert!(!url_has_extension(&url("http://x/admin")));
        // A dot in a parent directory does not count
        assert!(!url_has_extension(&url("http://x/v1.2/admin")));
    }

    #[test]
    fn test_split_basename() {
        let u = url("http://x/a/b/config");
        assert_eq!(split_basename(&u), Some(("/a/b", "config")));

        let u = url("http://x/");
        assert_eq!(split_basename(&u), Some(("", "")));

        let u = url("mailto:admin");
        assert_eq!(split_basename(&u), None);
    }
}
