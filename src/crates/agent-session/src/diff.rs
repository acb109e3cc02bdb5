//! Diffing the application's current files against an arbitrary baseline
//! (§4.6 step 4a/4c, §9 "Diff baseline selection"): the client's last known
//! `allFiles`, or nothing at all for a session's very first review.
//!
//! This is deliberately separate from [`workspace::Workspace::diff`], which
//! is scoped to a single workspace's own "start" snapshot — `AgentSession`
//! needs to diff `ApplicationContext::all_files()` against a baseline that
//! came from the *client*, not from any one workspace clone.

use workspace::FileMap;

/// A unified diff of `after` against `before`, one hunk set per touched
/// path, git's `/dev/null` convention for created/deleted files.
pub fn unified_diff(before: &FileMap, after: &FileMap) -> String {
    let mut paths: Vec<&String> = before.keys().chain(after.keys()).collect();
    paths.sort();
    paths.dedup();

    let mut out = String::new();
    for path in paths {
        let old = before.get(path).map(String::as_str);
        let new = after.get(path).map(String::as_str);
        if old == new {
            continue;
        }
        let old_label = if old.is_some() { format!("a/{}", path) } else { "/dev/null".to_string() };
        let new_label = if new.is_some() { format!("b/{}", path) } else { "/dev/null".to_string() };

        let diff = similar::TextDiff::from_lines(old.unwrap_or(""), new.unwrap_or(""));
        out.push_str(&diff.unified_diff().header(&old_label, &new_label).to_string());
    }
    out
}

/// The diff baseline for a session's files (§9): the client's `allFiles` if
/// it sent any, otherwise empty — meaning the very first review diffs the
/// whole generated template as pure additions.
pub fn baseline_from_request(all_files: Option<&[crate::wire::FileEntry]>) -> FileMap {
    match all_files {
        Some(entries) => entries.iter().map(|f| (f.path.clone(), f.content.clone())).collect(),
        None => FileMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_baseline_yields_dev_null_additions() {
        let before = FileMap::new();
        let mut after = FileMap::new();
        after.insert("server/src/index.ts".to_string(), "export const ok = true;\n".to_string());

        let diff = unified_diff(&before, &after);
        assert!(diff.contains("--- /dev/null"));
        assert!(diff.contains("+++ b/server/src/index.ts"));
        assert!(diff.contains("+export const ok = true;"));
    }

    #[test]
    fn unchanged_file_produces_no_hunks() {
        let mut before = FileMap::new();
        before.insert("a.txt".to_string(), "same\n".to_string());
        let after = before.clone();
        assert_eq!(unified_diff(&before, &after), "");
    }

    #[test]
    fn diff_is_idempotent_under_repeated_identical_writes() {
        let mut before = FileMap::new();
        before.insert("a.txt".to_string(), "x\n".to_string());
        let mut after = before.clone();
        after.insert("a.txt".to_string(), "y\n".to_string());

        let first = unified_diff(&before, &after);
        let second = unified_diff(&before, &after);
        assert_eq!(first, second);
    }
}
