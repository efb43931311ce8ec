//! `svn ls --xml`, `svn log --xml` and `svn info --xml` parsing

use roxmltree::{Document, Node};

use super::parse_timestamp;
use crate::types::{DirectoryEntry, Listing, LogEntry, NodeKind};
use crate::{Error, Result};

/// Fields of one `<entry>` of `svn info --xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub kind: NodeKind,
    pub url: Option<String>,
    pub revision: Option<String>,
    /// Working-copy schedule (`normal`, `add`, `delete`, `replace`), absent
    /// for repository URLs.
    pub schedule: Option<String>,
}

impl InfoEntry {
    /// Removed in the working copy but not yet committed.
    pub fn scheduled_for_deletion(&self) -> bool {
        self.schedule.as_deref() == Some("delete")
    }
}

fn document<'a>(xml: &'a str, format: &str) -> Result<Document<'a>> {
    Document::parse(xml).map_err(|e| Error::parse(format, e.to_string()))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
}

fn required_kind(node: Node<'_, '_>, format: &str) -> Result<NodeKind> {
    node.attribute("kind")
        .ok_or_else(|| Error::parse(format, "entry without kind attribute"))?
        .parse()
}

/// Parse `svn ls --xml` into a listing, keeping document order.
pub fn parse_ls(xml: &str) -> Result<Listing> {
    let doc = document(xml, "svn ls")?;
    let mut listing = Listing::new();

    for entry in doc.descendants().filter(|n| n.has_tag_name("entry")) {
        let name = child_text(entry, "name")
            .ok_or_else(|| Error::parse("svn ls", "entry without name"))?;
        let kind = required_kind(entry, "svn ls")?;
        let commit = entry.children().find(|n| n.has_tag_name("commit"));

        listing.insert(DirectoryEntry {
            name: name.to_string(),
            kind,
            last_commit: commit.and_then(|c| c.attribute("revision")).map(str::to_string),
            author: commit.and_then(|c| child_text(c, "author")).map(str::to_string),
            date: commit
                .and_then(|c| child_text(c, "date"))
                .and_then(parse_timestamp),
        });
    }

    Ok(listing)
}

/// Parse `svn log --xml`. svn already emits newest first.
pub fn parse_log(xml: &str) -> Result<Vec<LogEntry>> {
    // `svn log` prints nothing at all for an empty range on some versions
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc = document(xml, "svn log")?;

    doc.descendants()
        .filter(|n| n.has_tag_name("logentry"))
        .map(|entry| {
            let revision = entry
                .attribute("revision")
                .ok_or_else(|| Error::parse("svn log", "logentry without revision"))?;
            Ok(LogEntry {
                id: revision.to_string(),
                author: child_text(entry, "author").map(str::to_string),
                date: child_text(entry, "date").and_then(parse_timestamp),
                message: child_text(entry, "msg").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Parse the first entry of `svn info --xml`.
pub fn parse_info(xml: &str) -> Result<InfoEntry> {
    let doc = document(xml, "svn info")?;
    let entry = doc
        .descendants()
        .find(|n| n.has_tag_name("entry"))
        .ok_or_else(|| Error::parse("svn info", "no entry element"))?;

    Ok(InfoEntry {
        kind: required_kind(entry, "svn info")?,
        url: child_text(entry, "url").map(str::to_string),
        revision: entry.attribute("revision").map(str::to_string),
        schedule: entry
            .children()
            .find(|n| n.has_tag_name("wc-info"))
            .and_then(|wc| child_text(wc, "schedule"))
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LS_XML: &str = r#"<?xml version="1.0"?>
<lists>
<list path="/trunk">
    <entry kind="dir"><name>somedir</name><commit revision="123"><author>gerard</author><date>2012-05-29T16:43:43.722286Z</date></commit></entry>
    <entry kind="dir"><name>some-other-dir</name><commit revision="456"><author>gerard</author><date>2012-07-17T17:02:18.934071Z</date></commit></entry>
    <entry kind="file"><name>index.html</name><size>3743</size><commit revision="266"><author>gerard</author><date>2010-06-08T15:44:18.749707Z</date></commit></entry>
    <entry kind="file"><name>srv.php</name><size>1478</size><commit revision="257"><author>gerard</author><date>2010-03-29T15:52:56.586593Z</date></commit></entry>
</list>
</lists>"#;

    const LOG_XML: &str = r#"<?xml version="1.0"?>
<log>
    <logentry revision="10185"><author>gerard</author><date>2012-07-17T14:46:06.829645Z</date><msg>foo</msg></logentry>
    <logentry revision="10184"><author>gerard</author><date>2012-07-17T14:31:11.780124Z</date><msg>bar</msg></logentry>
    <logentry revision="10183"><author>gerard</author><date>2012-07-17T14:30:26.494507Z</date><msg>baz</msg></logentry>
</log>"#;

    #[test]
    fn test_parse_ls_keeps_listing_order() {
        let listing = parse_ls(LS_XML).unwrap();

        assert_eq!(
            listing.names().collect::<Vec<_>>(),
            vec!["somedir", "some-other-dir", "index.html", "srv.php"]
        );
        assert_eq!(listing.get("somedir").unwrap().last_commit.as_deref(), Some("123"));
        assert_eq!(listing.get("some-other-dir").unwrap().author.as_deref(), Some("gerard"));
        assert_eq!(listing.get("index.html").unwrap().kind, NodeKind::File);

        let date = listing.get("index.html").unwrap().date.unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2010-06-08");
    }

    #[test]
    fn test_parse_ls_empty_directory() {
        let xml = r#"<?xml version="1.0"?><lists><list path="file:///r/trunk/empty"></list></lists>"#;
        assert!(parse_ls(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_log() {
        let log = parse_log(LOG_XML).unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log[0].id, "10185");
        assert_eq!(log[1].author.as_deref(), Some("gerard"));
        assert_eq!(log[2].message, "baz");
    }

    #[test]
    fn test_parse_log_tolerates_anonymous_and_empty_messages() {
        let xml = r#"<log><logentry revision="1"><date>2012-07-17T14:30:26.494507Z</date></logentry></log>"#;
        let log = parse_log(xml).unwrap();
        assert_eq!(log[0].author, None);
        assert_eq!(log[0].message, "");
        assert!(parse_log("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_info() {
        let xml = r#"<info>
<entry kind="dir" path="foo" revision="10192">
<url>bogus://example/foo</url>
<repository><root>bogus://example/</root></repository>
</entry>
</info>"#;
        let info = parse_info(xml).unwrap();
        assert_eq!(info.kind, NodeKind::Dir);
        assert_eq!(info.url.as_deref(), Some("bogus://example/foo"));
        assert_eq!(info.revision.as_deref(), Some("10192"));
        assert_eq!(info.schedule, None);
    }

    #[test]
    fn test_parse_info_schedule() {
        let xml = r#"<info><entry kind="file" path="a.txt" revision="4">
<url>file:///r/trunk/a.txt</url>
<wc-info><schedule>delete</schedule><depth>infinity</depth></wc-info>
</entry></info>"#;
        assert!(parse_info(xml).unwrap().scheduled_for_deletion());
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        assert!(matches!(parse_ls("<lists><list>"), Err(Error::Parse { .. })));
        assert!(matches!(parse_info("<info/>"), Err(Error::Parse { .. })));
    }
}
