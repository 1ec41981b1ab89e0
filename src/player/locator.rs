//! Source locator normalization against the backend origin

/// Backend origin used to turn relative media paths into absolute URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    base: String,
}

impl Origin {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base }
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Resolve a raw locator to an absolute one.
    ///
    /// Empty input stays empty and means "unplayable". Anything that already
    /// starts with `http` is returned untouched.
    pub fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }
        if raw.starts_with("http") {
            return raw.to_string();
        }
        if raw.starts_with('/') {
            format!("{}{}", self.base, raw)
        } else {
            format!("{}/{}", self.base, raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_relative_paths() {
        let origin = Origin::new("http://127.0.0.1:8000");
        assert_eq!(
            origin.resolve("/media/songs/a.mp3"),
            "http://127.0.0.1:8000/media/songs/a.mp3"
        );
        assert_eq!(
            origin.resolve("media/songs/a.mp3"),
            "http://127.0.0.1:8000/media/songs/a.mp3"
        );
    }

    #[test]
    fn keeps_absolute_locators() {
        let origin = Origin::new("http://127.0.0.1:8000/");
        assert_eq!(origin.resolve("https://cdn.example.com/a.mp3"), "https://cdn.example.com/a.mp3");
        assert_eq!(origin.resolve("http://other:9000/a.mp3"), "http://other:9000/a.mp3");
    }

    #[test]
    fn empty_stays_empty() {
        let origin = Origin::new("http://127.0.0.1:8000");
        assert_eq!(origin.resolve(""), "");
        assert_eq!(origin.resolve("   "), "");
    }

    #[test]
    fn trailing_slash_on_origin_is_dropped() {
        let origin = Origin::new("http://harmoura.local/");
        assert_eq!(origin.as_str(), "http://harmoura.local");
        assert_eq!(origin.resolve("/media/x.mp3"), "http://harmoura.local/media/x.mp3");
    }
}
