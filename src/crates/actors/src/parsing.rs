//! Parses an actor's completion text into a file-path → content map.
//!
//! Actors that describe their output as plain completion text (Draft,
//! Handlers, Index) wrap each file in a `=== FILE: <path> ===` /
//! `=== END FILE ===` block; this is the one convention every stage profile
//! in this crate shares.

use workspace::FileMap;

pub fn parse_file_blocks(text: &str) -> FileMap {
    let mut files = FileMap::new();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(path) = line.trim().strip_prefix("=== FILE: ").and_then(|s| s.strip_suffix(" ===")) else {
            continue;
        };

        let mut content = String::new();
        for body_line in lines.by_ref() {
            if body_line.trim() == "=== END FILE ===" {
                break;
            }
            content.push_str(body_line);
            content.push('\n');
        }
        files.insert(path.trim().to_string(), content);
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_file_block() {
        let text = "preamble\n=== FILE: server/src/index.ts ===\nexport const x = 1;\n=== END FILE ===\ntrailer";
        let files = parse_file_blocks(text);
        assert_eq!(files.get("server/src/index.ts").unwrap(), "export const x = 1;\n");
    }

    #[test]
    fn parses_multiple_file_blocks() {
        let text = "=== FILE: a.ts ===\nA\n=== END FILE ===\n=== FILE: b.ts ===\nB\n=== END FILE ===\n";
        let files = parse_file_blocks(text);
        assert_eq!(files.len(), 2);
        assert_eq!(files.get("a.ts").unwrap(), "A\n");
        assert_eq!(files.get("b.ts").unwrap(), "B\n");
    }

    #[test]
    fn no_file_blocks_yields_empty_map() {
        assert!(parse_file_blocks("just some prose, no files here").is_empty());
    }
}
