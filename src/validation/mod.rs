use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FormField {
    Title,
    Url,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("Please enter a bookmark title")]
    EmptyTitle,
    #[error("Please enter a website URL")]
    EmptyUrl,
    #[error("Please enter a valid URL")]
    InvalidUrl,
}

impl ValidationError {
    pub fn field(&self) -> FormField {
        match self {
            Self::EmptyTitle => FormField::Title,
            Self::EmptyUrl | Self::InvalidUrl => FormField::Url,
        }
    }
}

/// Validated, normalized form input. Carries no owner yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BookmarkDraft {
    pub title: String,
    pub url: String,
}

pub(crate) fn validate_bookmark(title: &str, url: &str) -> Result<BookmarkDraft, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let url = normalize_url(url)?;

    Ok(BookmarkDraft {
        title: title.to_string(),
        url,
    })
}

/// Trims `raw`, prepends `https://` unless it already starts with `http://` or
/// `https://`, and checks the result parses as an absolute URL. Any other
/// scheme ends up behind the prefix, so only web links are ever stored.
///
/// The returned string is the prefixed input as typed, not the parser's
/// serialization (`example.com` stays `https://example.com`, no trailing `/`).
pub(crate) fn normalize_url(raw: &str) -> Result<String, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let candidate = if has_web_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    match reqwest::Url::parse(&candidate) {
        Ok(parsed) if !parsed.cannot_be_a_base() => Ok(candidate),
        _ => Err(ValidationError::InvalidUrl),
    }
}

fn has_web_scheme(s: &str) -> bool {
    s.split_once("://").is_some_and(|(scheme, _)| {
        scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prepends_https_when_scheme_missing() {
        assert_eq!(normalize_url("example.com").as_deref(), Ok("https://example.com"));
        assert_eq!(
            normalize_url("  news.ycombinator.com/item?id=1  ").as_deref(),
            Ok("https://news.ycombinator.com/item?id=1")
        );
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://example.com").as_deref(), Ok("http://example.com"));
        assert_eq!(normalize_url("https://example.com/a").as_deref(), Ok("https://example.com/a"));
        assert_eq!(normalize_url("HTTPS://Example.com").as_deref(), Ok("HTTPS://Example.com"));
    }

    #[test]
    fn test_non_web_schemes_never_stored_as_is() {
        for raw in [
            "javascript://%0aalert(document.cookie)",
            "data://text/html,x",
            "file:///etc/passwd",
            "ftp://files.example.com",
            "javascript:alert(1)",
        ] {
            match normalize_url(raw) {
                Ok(url) => assert_eq!(url, format!("https://{raw}")),
                Err(e) => assert_eq!(e, ValidationError::InvalidUrl),
            }
        }
    }

    #[test]
    fn test_host_with_port_is_not_a_scheme() {
        assert_eq!(
            normalize_url("localhost:3000/docs").as_deref(),
            Ok("https://localhost:3000/docs")
        );
    }

    #[test]
    fn test_normalize_rejects_empty_and_malformed() {
        assert_eq!(normalize_url(""), Err(ValidationError::EmptyUrl));
        assert_eq!(normalize_url("   "), Err(ValidationError::EmptyUrl));
        assert_eq!(normalize_url("https://"), Err(ValidationError::InvalidUrl));
        assert_eq!(normalize_url("exa mple.com"), Err(ValidationError::InvalidUrl));
    }

    #[test]
    fn test_validate_trims_title_and_checks_title_first() {
        let draft = validate_bookmark("  Example ", "example.com").expect("valid input");
        assert_eq!(draft.title, "Example");
        assert_eq!(draft.url, "https://example.com");

        let err = validate_bookmark(" ", "").expect_err("empty title");
        assert_eq!(err, ValidationError::EmptyTitle);
        assert_eq!(err.field(), FormField::Title);

        let err = validate_bookmark("Example", " ").expect_err("empty url");
        assert_eq!(err.field(), FormField::Url);
    }

    #[test]
    fn test_any_schemeless_host_gets_https_prefix() {
        for host in ["a.io", "docs.rs/leptos", "sub.domain.example.org/x?y=1#z", "127.0.0.1:8080"] {
            let normalized = normalize_url(host).expect("host should be valid");
            assert_eq!(normalized, format!("https://{host}"));
        }
    }
}
