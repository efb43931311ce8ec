//! Contract properties checked against real repositories for every backend

mod common;

use pretty_assertions::assert_eq;
use rstest::rstest;
use vstore_client::{BackendKind, Client, Error, NodeKind, VcsClient};

use common::{Remote, client};

/// A bound client, or `None` when the backend is not installed.
fn bound(kind: BackendKind) -> Option<(Remote, Client)> {
    let remote = Remote::for_kind(kind)?;
    let mut client = client(kind);
    client.init(&remote.url).unwrap();
    Some((remote, client))
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_round_trip(#[case] kind: BackendKind) {
    let Some((_remote, mut client)) = bound(kind) else {
        return;
    };

    for (path, content) in [
        ("top.txt", "top"),
        ("a/b/c/deep.txt", "deep"),
        ("with space.txt", "spaced\n"),
    ] {
        client.put(path, content, &format!("Add {path}")).unwrap();
        client.push().unwrap();
        assert_eq!(client.get(path).unwrap().as_deref(), Some(content), "{path}");
        assert!(client.has(path, NodeKind::File).unwrap());
    }
    assert!(client.has("a/b", NodeKind::Dir).unwrap());
    assert!(!client.has("a/b", NodeKind::File).unwrap());
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_deletion(#[case] kind: BackendKind) {
    let Some((_remote, mut client)) = bound(kind) else {
        return;
    };
    client.put("gone.txt", "x", "add").unwrap();
    client.push().unwrap();

    client.rm("gone.txt", "remove").unwrap();
    client.push().unwrap();

    assert_eq!(client.get("gone.txt").unwrap(), None);
    assert!(!client.has("gone.txt", NodeKind::File).unwrap());
    assert!(!client.ls("").unwrap().contains("gone.txt"));
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_missing_paths_are_not_errors(#[case] kind: BackendKind) {
    let Some((_remote, client)) = bound(kind) else {
        return;
    };

    assert_eq!(client.get("no/such/file.txt").unwrap(), None);
    assert!(!client.has("no/such", NodeKind::Dir).unwrap());
    assert!(client.ls("no/such").unwrap().is_empty());
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_log_is_newest_first_and_limited(#[case] kind: BackendKind) {
    let Some((_remote, mut client)) = bound(kind) else {
        return;
    };
    for n in 1..=3 {
        client.put("log.txt", &format!("v{n}"), &format!("edit {n}")).unwrap();
        client.push().unwrap();
    }
    client.pull().unwrap();

    let log = client.log("log.txt", 2).unwrap();
    let messages: Vec<_> = log.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["edit 3", "edit 2"]);

    assert_eq!(client.log("log.txt", 0).unwrap().len(), 3);

    let newest = &log[0];
    let found = client.get_commit(&newest.id, Some("log.txt")).unwrap().unwrap();
    assert_eq!(&found, newest);
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_unknown_revision_is_none(#[case] kind: BackendKind) {
    let Some((_remote, client)) = bound(kind) else {
        return;
    };
    let unknown = match kind {
        BackendKind::Git => "0000000000000000000000000000000000000001",
        _ => "9999",
    };

    assert_eq!(client.get_commit(unknown, None).unwrap(), None);
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_ls_lists_files_and_directories(#[case] kind: BackendKind) {
    let Some((_remote, mut client)) = bound(kind) else {
        return;
    };
    client.put("dir/a.txt", "a", "add a").unwrap();
    client.put("dir/sub/b.txt", "b", "add b").unwrap();
    client.push().unwrap();
    client.pull().unwrap();

    let listing = client.ls("dir").unwrap();

    assert_eq!(listing.len(), 2);
    assert_eq!(listing.get("a.txt").unwrap().kind, NodeKind::File);
    assert_eq!(listing.get("sub").unwrap().kind, NodeKind::Dir);
    assert!(listing.get("a.txt").unwrap().last_commit.is_some());
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_checkout_is_idempotent(#[case] kind: BackendKind) {
    let Some((_remote, mut client)) = bound(kind) else {
        return;
    };
    client.put("a.txt", "trunk", "add").unwrap();
    client.push().unwrap();
    client.branch("qux", true).unwrap();
    client.push().unwrap();
    client.checkout(None).unwrap();

    client.checkout(Some("qux")).unwrap();
    let once = (client.reference().cloned(), client.get("a.txt").unwrap());
    client.checkout(Some("qux")).unwrap();
    let twice = (client.reference().cloned(), client.get("a.txt").unwrap());

    assert_eq!(once, twice);
    assert_eq!(once.0.unwrap().current_ref.as_deref(), Some("qux"));
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_tag_snapshots_current_content(#[case] kind: BackendKind) {
    let Some((_remote, mut client)) = bound(kind) else {
        return;
    };
    client.put("a.txt", "v1", "first").unwrap();
    client.push().unwrap();
    client.tag("v1").unwrap();
    client.put("a.txt", "v2", "second").unwrap();
    client.push().unwrap();

    assert_eq!(client.reference().unwrap().current_ref, None);

    client.checkout(Some("tags/v1")).unwrap();
    assert_eq!(client.get("a.txt").unwrap().as_deref(), Some("v1"));

    client.checkout(None).unwrap();
    assert_eq!(client.get("a.txt").unwrap().as_deref(), Some("v2"));
}

#[rstest]
#[case::git(BackendKind::Git)]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_tags_are_read_only(#[case] kind: BackendKind) {
    let Some((_remote, mut client)) = bound(kind) else {
        return;
    };
    client.put("a.txt", "v1", "first").unwrap();
    client.push().unwrap();
    client.tag("v1").unwrap();
    client.checkout(Some("tags/v1")).unwrap();

    let write = match kind {
        BackendKind::RemoteSvn => client.put("a.txt", "v2", "second"),
        _ => client.push(),
    };

    assert!(matches!(write, Err(Error::ReadOnlyRef { .. })));
    assert_eq!(client.get("a.txt").unwrap().as_deref(), Some("v1"));
}

#[rstest]
#[case::svn(BackendKind::Svn)]
#[case::svn_remote(BackendKind::RemoteSvn)]
fn test_svn_repository_root_has_no_layout(#[case] kind: BackendKind) {
    let Some(remote) = Remote::for_kind(kind) else {
        return;
    };
    let root = remote.url.trim_end_matches("/trunk").to_string();
    let mut client = client(kind);
    client.init(&root).unwrap();

    assert!(matches!(client.branch("qux", false), Err(Error::Layout { .. })));
    assert!(client.has("trunk", NodeKind::Dir).unwrap());
}

#[test]
fn test_git_local_branch_is_published_by_checkout_and_push() {
    let Some((remote, mut client)) = bound(BackendKind::Git) else {
        return;
    };
    client.branch("local", false).unwrap();
    client.checkout(Some("local")).unwrap();
    client.put("a.txt", "local", "on local").unwrap();
    client.push().unwrap();
    assert_eq!(client.reference().unwrap().current_ref.as_deref(), Some("local"));

    let mut other = common::client(BackendKind::Git);
    other.init(&remote.url).unwrap();
    other.checkout(Some("local")).unwrap();
    assert_eq!(other.get("a.txt").unwrap().as_deref(), Some("local"));
}
