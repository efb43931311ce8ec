//! Two independent clients sharing one remote
//!
//! Every pairing walks the same sequence: write, read from the other
//! client, overwrite, delete, then branch and check that branch content
//! stays on the branch.

mod common;

use pretty_assertions::assert_eq;
use rstest::rstest;
use vstore_client::{BackendKind, VcsClient};

use common::{Remote, client};

#[rstest]
#[case::svn_working_copies(BackendKind::Svn, BackendKind::Svn)]
#[case::svn_without_working_copies(BackendKind::RemoteSvn, BackendKind::RemoteSvn)]
#[case::svn_mixed(BackendKind::Svn, BackendKind::RemoteSvn)]
#[case::git(BackendKind::Git, BackendKind::Git)]
fn test_two_clients_share_history(#[case] first: BackendKind, #[case] second: BackendKind) {
    let Some(remote) = Remote::for_kind(first) else {
        return;
    };
    let mut client1 = client(first);
    let mut client2 = client(second);

    // Write and read back
    client1.init(&remote.url).unwrap();
    client1.put("foo/bar.txt", "Hello", "m1").unwrap();
    client1.push().unwrap();
    assert_eq!(client1.get("foo/bar.txt").unwrap().as_deref(), Some("Hello"));

    // Visible to a second client
    client2.init(&remote.url).unwrap();
    assert_eq!(client2.get("foo/bar.txt").unwrap().as_deref(), Some("Hello"));

    // Overwrite from the other side
    client2.put("foo/bar.txt", "Goodbye", "m2").unwrap();
    client2.push().unwrap();
    client1.pull().unwrap();
    assert_eq!(client1.get("foo/bar.txt").unwrap().as_deref(), Some("Goodbye"));

    // Delete
    client1.rm("foo/bar.txt", "del").unwrap();
    client1.push().unwrap();
    client2.pull().unwrap();
    assert_eq!(client2.get("foo/bar.txt").unwrap(), None);

    // Branch isolation
    client2.branch("qux", true).unwrap();
    client2.push().unwrap();
    client1.pull().unwrap();
    client1.checkout(Some("qux")).unwrap();
    client1.put("foo/bar/baz.txt", "Waaa", "m3").unwrap();
    client1.push().unwrap();
    client2.pull().unwrap();
    assert_eq!(client2.get("foo/bar/baz.txt").unwrap().as_deref(), Some("Waaa"));

    client2.checkout(None).unwrap();
    assert_eq!(client2.get("foo/bar/baz.txt").unwrap(), None);

    client2.checkout(Some("qux")).unwrap();
    assert_eq!(client2.get("foo/bar/baz.txt").unwrap().as_deref(), Some("Waaa"));
}
