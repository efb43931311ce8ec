//! Subversion trunk/branches/tags layout resolution

use std::sync::LazyLock;

use regex::Regex;

use crate::contract::validate_ref_name;
use crate::{Error, Result};

static LAYOUT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)/(?:(trunk)|branches/([^/]+)|tags/([^/]+))/?$").unwrap()
});

/// Which convention directory a URL points into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Trunk,
    Branch(String),
    Tag(String),
}

impl Segment {
    /// `trunk`, `branches/<name>` or `tags/<name>`.
    pub fn as_path(&self) -> String {
        match self {
            Self::Trunk => "trunk".to_string(),
            Self::Branch(name) => format!("branches/{name}"),
            Self::Tag(name) => format!("tags/{name}"),
        }
    }

    /// The checkout reference selecting this segment. Trunk is `None`.
    pub fn ref_name(&self) -> Option<String> {
        match self {
            Self::Trunk => None,
            Self::Branch(name) => Some(name.clone()),
            Self::Tag(name) => Some(format!("tags/{name}")),
        }
    }
}

/// The URL prefix preceding `trunk`, `branches/<name>` or `tags/<name>`.
///
/// Derived from a URL each time it is needed, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoRoot {
    root: String,
    segment: Segment,
}

impl PseudoRoot {
    /// Split `url` into its pseudo-root and convention segment.
    ///
    /// Fails with [`Error::Layout`] when the URL does not end in a
    /// recognizable segment, e.g. a bare repository root.
    pub fn resolve(url: &str) -> Result<Self> {
        let layout_error = || Error::Layout {
            url: url.to_string(),
        };
        let caps = LAYOUT_PATTERN.captures(url).ok_or_else(layout_error)?;

        let root = caps[1].trim_end_matches('/');
        if root.is_empty() {
            return Err(layout_error());
        }

        let segment = if caps.get(2).is_some() {
            Segment::Trunk
        } else if let Some(name) = caps.get(3) {
            Segment::Branch(name.as_str().to_string())
        } else if let Some(name) = caps.get(4) {
            Segment::Tag(name.as_str().to_string())
        } else {
            return Err(layout_error());
        };

        Ok(Self {
            root: root.to_string(),
            segment,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn trunk_url(&self) -> String {
        format!("{}/trunk", self.root)
    }

    pub fn branch_url(&self, name: &str) -> String {
        format!("{}/branches/{}", self.root, name)
    }

    pub fn tag_url(&self, name: &str) -> String {
        format!("{}/tags/{}", self.root, name)
    }

    /// URL selected by a checkout reference.
    ///
    /// `None` is trunk; `tags/<name>` is a tag; `branches/<name>` or a plain
    /// name is a branch.
    pub fn ref_url(&self, reference: Option<&str>) -> Result<String> {
        let Some(reference) = reference else {
            return Ok(self.trunk_url());
        };

        if let Some(name) = reference.strip_prefix("tags/") {
            validate_ref_name(name)?;
            Ok(self.tag_url(name))
        } else {
            let name = reference.strip_prefix("branches/").unwrap_or(reference);
            validate_ref_name(name)?;
            Ok(self.branch_url(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://h/repo/trunk", "https://h/repo", Segment::Trunk)]
    #[case("https://h/repo/trunk/", "https://h/repo", Segment::Trunk)]
    #[case("https://h/repo/branches/foo", "https://h/repo", Segment::Branch("foo".into()))]
    #[case("https://h/repo/tags/v1", "https://h/repo", Segment::Tag("v1".into()))]
    #[case("file:///srv/svn/project/trunk", "file:///srv/svn/project", Segment::Trunk)]
    #[case("https://h/trunk/nested/trunk", "https://h/trunk/nested", Segment::Trunk)]
    #[case("https://h/repo/branches/trunk", "https://h/repo", Segment::Branch("trunk".into()))]
    #[case("https://h/repo/tags/trunk/", "https://h/repo", Segment::Tag("trunk".into()))]
    #[case("https://h/repo/branches/tags", "https://h/repo", Segment::Branch("tags".into()))]
    fn test_resolve(#[case] url: &str, #[case] root: &str, #[case] segment: Segment) {
        let resolved = PseudoRoot::resolve(url).unwrap();
        assert_eq!(resolved.root(), root);
        assert_eq!(resolved.segment(), &segment);
    }

    #[rstest]
    #[case("https://h/repo/master")]
    #[case("https://h/repo")]
    #[case("https://h/repo/xtrunk")]
    #[case("https://h/repo/branches")]
    #[case("https://h/repo/branches/foo/sub")]
    #[case("https://h/repo/trunk/src")]
    #[case("/trunk")]
    fn test_resolve_rejects(#[case] url: &str) {
        let err = PseudoRoot::resolve(url).unwrap_err();
        assert!(matches!(err, Error::Layout { .. }), "got {err:?}");
    }

    #[test]
    fn test_derived_urls() {
        let resolved = PseudoRoot::resolve("https://h/repo/branches/foo").unwrap();
        assert_eq!(resolved.trunk_url(), "https://h/repo/trunk");
        assert_eq!(resolved.branch_url("qux"), "https://h/repo/branches/qux");
        assert_eq!(resolved.tag_url("v1"), "https://h/repo/tags/v1");
    }

    #[rstest]
    #[case(None, "https://h/repo/trunk")]
    #[case(Some("qux"), "https://h/repo/branches/qux")]
    #[case(Some("branches/qux"), "https://h/repo/branches/qux")]
    #[case(Some("tags/v1"), "https://h/repo/tags/v1")]
    fn test_ref_url(#[case] reference: Option<&str>, #[case] expected: &str) {
        let resolved = PseudoRoot::resolve("https://h/repo/trunk").unwrap();
        assert_eq!(resolved.ref_url(reference).unwrap(), expected);
    }

    #[test]
    fn test_ref_url_rejects_nested_names() {
        let resolved = PseudoRoot::resolve("https://h/repo/trunk").unwrap();
        assert!(resolved.ref_url(Some("a/b")).is_err());
        assert!(resolved.ref_url(Some("tags/")).is_err());
    }

    #[test]
    fn test_segment_ref_name() {
        assert_eq!(Segment::Trunk.ref_name(), None);
        assert_eq!(Segment::Branch("qux".into()).ref_name().as_deref(), Some("qux"));
        assert_eq!(Segment::Tag("v1".into()).ref_name().as_deref(), Some("tags/v1"));
        assert_eq!(Segment::Tag("v1".into()).as_path(), "tags/v1");
    }
}
