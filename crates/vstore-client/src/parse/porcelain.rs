//! `git status --porcelain` (v1) parsing

/// One line of porcelain status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub index: char,
    pub worktree: char,
    pub path: String,
    /// Source path of a rename or copy.
    pub original: Option<String>,
}

impl StatusEntry {
    /// The path no longer exists in the working tree.
    pub fn is_deleted(&self) -> bool {
        self.index == 'D' || self.worktree == 'D'
    }
}

/// Parse porcelain v1 output. Malformed lines are skipped.
pub fn parse_status(output: &str) -> Vec<StatusEntry> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<StatusEntry> {
    let mut chars = line.chars();
    let index = chars.next()?;
    let worktree = chars.next()?;
    let rest = line.get(3..)?;
    if rest.is_empty() {
        return None;
    }

    let (original, path) = match rest.split_once(" -> ") {
        Some((from, to)) if index == 'R' || index == 'C' => (Some(unquote(from)), unquote(to)),
        _ => (None, unquote(rest)),
    };

    Some(StatusEntry {
        index,
        worktree,
        path,
        original,
    })
}

/// Undo git's C-style quoting of paths with special characters.
pub fn unquote(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let escaped = bytes[i + 1];
        match escaped {
            b'0'..=b'7' => {
                let digits: Vec<u8> = bytes[i + 1..]
                    .iter()
                    .take(3)
                    .take_while(|b| matches!(**b, b'0'..=b'7'))
                    .copied()
                    .collect();
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                out.push(value as u8);
                i += 1 + digits.len();
            }
            _ => {
                out.push(match escaped {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'v' => 0x0b,
                    other => other,
                });
                i += 2;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}
