//! Classification of Subversion failures by their structured error codes
//!
//! svn prints every error and warning as `svn: E######: ...` or
//! `svn: warning: W######: ...`. Only the codes are inspected, never the
//! localized message text.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Lookup;
use crate::Result;

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([EW]\d{6})\b").unwrap());

/// Codes meaning the requested path does not exist.
const PATH_NOT_FOUND: &[&str] = &[
    "E155010", // node not found in working copy
    "W155010",
    "E160013", // path not found in repository
    "W160013",
    "W170000", // URL non-existent in revision
];

/// Codes meaning the requested revision does not exist or does not reach
/// the path.
const REVISION_NOT_FOUND: &[&str] = &[
    "E160006", // no such revision
    "E195012", // path not present in that revision
];

/// "Could not <op> all targets because some targets don't exist".
const SOME_TARGETS_MISSING: &str = "E200009";

/// All error and warning codes mentioned in `stderr`, in order.
pub fn error_codes(stderr: &str) -> Vec<&str> {
    CODE_PATTERN
        .captures_iter(stderr)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// True when the failure only reports missing paths.
///
/// Any additional error code makes the failure a real one, so a connection
/// or authentication problem is never mistaken for absence.
pub fn is_path_not_found(err: &vstore_exec::Error) -> bool {
    classify(err, PATH_NOT_FOUND)
}

/// Like [`is_path_not_found`], additionally accepting a missing revision.
pub fn is_revision_not_found(err: &vstore_exec::Error) -> bool {
    let codes: Vec<&str> = PATH_NOT_FOUND
        .iter()
        .chain(REVISION_NOT_FOUND)
        .copied()
        .collect();
    classify(err, &codes)
}

fn classify(err: &vstore_exec::Error, not_found: &[&str]) -> bool {
    let Some(stderr) = err.stderr() else {
        return false;
    };
    let codes = error_codes(stderr);

    let mentions_missing = codes.iter().any(|code| not_found.contains(code));
    let only_missing = codes.iter().all(|code| {
        not_found.contains(code) || *code == SOME_TARGETS_MISSING || code.starts_with('W')
    });
    mentions_missing && only_missing
}

/// Absorb a path-not-found failure into [`Lookup::NotFound`].
pub fn lookup<T>(result: vstore_exec::Result<T>) -> Result<Lookup<T>> {
    match result {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(err) if is_path_not_found(&err) => Ok(Lookup::NotFound),
        Err(err) => Err(err.into()),
    }
}

/// Absorb a missing path or revision into [`Lookup::NotFound`].
pub fn lookup_revision<T>(result: vstore_exec::Result<T>) -> Result<Lookup<T>> {
    match result {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(err) if is_revision_not_found(&err) => Ok(Lookup::NotFound),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn failed(stderr: &str) -> vstore_exec::Error {
        vstore_exec::Error::CommandFailed {
            command: "svn info".into(),
            exit_status: 1,
            stderr: stderr.into(),
        }
    }

    #[test]
    fn test_error_codes_extracts_all() {
        let stderr = "svn: warning: W155010: The node '/wc/x' was not found.\n\
                      svn: E200009: Could not display info for all targets because some targets don't exist";
        assert_eq!(error_codes(stderr), vec!["W155010", "E200009"]);
    }

    #[rstest]
    #[case("svn: warning: W155010: The node '/wc/missing' was not found.\nsvn: E200009: Could not cat all targets because some targets don't exist")]
    #[case("svn: E160013: File not found: revision 4, path '/trunk/nope'")]
    #[case("svn: warning: W160013: Path '/trunk/x' not found\nsvn: E200009: Could not list all targets because some targets don't exist")]
    #[case("svn: warning: W170000: URL 'file:///r/trunk/x' non-existent in revision 3\nsvn: E200009: Could not display info for all targets because some targets don't exist")]
    fn test_path_not_found(#[case] stderr: &str) {
        assert!(is_path_not_found(&failed(stderr)));
    }

    #[rstest]
    #[case("svn: E170013: Unable to connect to a repository at URL 'https://h/repo/trunk'")]
    #[case("svn: E215004: Authentication failed and interactive prompting is disabled")]
    #[case("svn: warning: W160013: gone\nsvn: E170013: Unable to connect")]
    #[case("the node was not found")]
    #[case("")]
    fn test_other_failures_are_not_absorbed(#[case] stderr: &str) {
        assert!(!is_path_not_found(&failed(stderr)));
    }

    #[test]
    fn test_missing_revision_only_counts_for_revision_lookups() {
        let err = failed("svn: E160006: No such revision 99");
        assert!(!is_path_not_found(&err));
        assert!(is_revision_not_found(&err));
    }

    #[test]
    fn test_non_command_errors_propagate() {
        let err = vstore_exec::Error::BinaryNotFound {
            binary: "svn".into(),
        };
        assert!(lookup::<String>(Err(err)).is_err());
    }

    #[test]
    fn test_lookup_absorbs_not_found() {
        let result = lookup::<String>(Err(failed("svn: E160013: File not found")));
        assert_eq!(result.unwrap(), Lookup::NotFound);
        assert_eq!(lookup(Ok("x".to_string())).unwrap(), Lookup::Found("x".to_string()));
    }
}
