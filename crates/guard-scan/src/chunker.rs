//! Line-bounded chunking and language hints.

use guard_core::entities::CodeChunk;

/// Split `content` into contiguous, non-overlapping ranges of `chunk_lines`
/// lines. Chunks made only of blank lines are not emitted.
#[must_use]
pub fn chunk_file(file_path: &str, content: &str, chunk_lines: usize) -> Vec<CodeChunk> {
    let lines: Vec<&str> = content.lines().collect();
    let size = chunk_lines.max(1);
    lines
        .chunks(size)
        .enumerate()
        .filter(|(_, window)| window.iter().any(|l| !l.trim().is_empty()))
        .filter_map(|(i, window)| {
            let start = u32::try_from(i * size + 1).ok()?;
            let len = u32::try_from(window.len()).ok()?;
            Some(CodeChunk {
                file_path: file_path.to_string(),
                start_line: start,
                end_line: start + len - 1,
                text: window.join("\n"),
            })
        })
        .collect()
}

/// Fence language for a file path, `text` when unknown.
#[must_use]
pub fn language_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "py" => "python",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "java" => "java",
        "html" => "html",
        "css" => "css",
        "cpp" => "cpp",
        "c" | "h" => "c",
        "go" => "go",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" => "kotlin",
        "rs" => "rust",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn ranges_are_contiguous_and_cover_the_file() {
        let chunks = chunk_file("a.py", &numbered(65), 30);
        let ranges: Vec<_> = chunks.iter().map(|c| (c.start_line, c.end_line)).collect();
        assert_eq!(ranges, vec![(1, 30), (31, 60), (61, 65)]);
        assert!(chunks[1].text.starts_with("line 31\n"));
        assert!(chunks[2].text.ends_with("line 65"));
    }

    #[test]
    fn empty_and_blank_content_yield_nothing() {
        assert!(chunk_file("a.py", "", 30).is_empty());
        assert!(chunk_file("a.py", "\n  \n\t\n", 30).is_empty());
    }

    #[test]
    fn blank_chunk_in_the_middle_keeps_later_numbering() {
        let content = format!("a{}b", "\n".repeat(40));
        let chunks = chunk_file("a.py", &content, 20);
        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[1].start_line, chunks[1].end_line), (41, 41));
    }

    #[rstest]
    #[case("auth.py", "python")]
    #[case("src/App.TSX", "typescript")]
    #[case("lib/util.h", "c")]
    #[case("Main.kt", "kotlin")]
    #[case("src/main.rs", "rust")]
    #[case("Makefile", "text")]
    #[case("notes.unknown", "text")]
    fn languages(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(language_for(path), expected);
    }
}
