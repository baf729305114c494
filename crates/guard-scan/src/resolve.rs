//! Resolution of candidate patterns against a concrete source tree.
//!
//! Globs are matched with `globset` against relative paths. Keywords are
//! case-insensitive literals matched against the relative path first and the
//! file contents second, using ripgrep's searcher. Patterns that match nothing
//! (or do not compile) are dropped. Extensions never match; they decide which
//! matches survive truncation.

use std::collections::BTreeSet;
use std::io;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use grep::matcher::Matcher;
use grep::regex::{RegexMatcher, RegexMatcherBuilder};
use grep::searcher::{BinaryDetection, Searcher, SearcherBuilder, Sink, SinkMatch};

use guard_core::entities::{CandidatePattern, FileCandidate};
use guard_core::enums::{MatchReason, ScanPass};

use crate::error::ScanError;
use crate::walk::SourceTree;

/// Where resolved files go and which ones to leave out.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub reason: MatchReason,
    pub pass: ScanPass,
    /// Files already scanned in an earlier pass.
    pub exclude: &'a BTreeSet<String>,
    /// At most this many files are returned.
    pub limit: usize,
}

/// Match `patterns` against `tree`. Output is sorted by path and unique.
#[must_use]
pub fn resolve(
    tree: &SourceTree,
    patterns: &BTreeSet<CandidatePattern>,
    resolution: &Resolution<'_>,
) -> Vec<FileCandidate> {
    let everything = patterns.contains(&CandidatePattern::Everything);
    let globs = build_globset(patterns.iter().filter_map(|p| match p {
        CandidatePattern::Glob(g) => Some(g.as_str()),
        _ => None,
    }));
    let keywords: Vec<KeywordMatcher> = patterns
        .iter()
        .filter_map(|p| match p {
            CandidatePattern::Keyword(k) => match KeywordMatcher::new(k) {
                Ok(m) => Some(m),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping keyword");
                    None
                }
            },
            _ => None,
        })
        .collect();

    let mut searcher = SearcherBuilder::new()
        .binary_detection(BinaryDetection::quit(b'\x00'))
        .line_number(false)
        .build();

    let mut matched = Vec::new();
    for rel in tree.files() {
        if resolution.exclude.contains(rel) {
            continue;
        }
        let hit = everything
            || globs.as_ref().is_some_and(|g| g.is_match(rel))
            || keywords.iter().any(|k| k.matches_path(rel))
            || keywords
                .iter()
                .any(|k| k.matches_contents(&mut searcher, tree, rel));
        if hit {
            matched.push(FileCandidate {
                path: rel.clone(),
                match_reason: resolution.reason,
                pass: resolution.pass,
            });
        }
    }

    if matched.len() > resolution.limit {
        tracing::warn!(
            matched = matched.len(),
            limit = resolution.limit,
            pass = %resolution.pass,
            "too many candidate files, truncating"
        );
        let preferred: Vec<&str> = patterns
            .iter()
            .filter_map(|p| match p {
                CandidatePattern::Extension(e) => Some(e.as_str()),
                _ => None,
            })
            .collect();
        // stable: path order holds within each group
        matched.sort_by_key(|f| !has_extension(&f.path, &preferred));
        matched.truncate(resolution.limit);
        matched.sort_by(|a, b| a.path.cmp(&b.path));
    }
    tracing::debug!(
        pass = %resolution.pass,
        selecting = patterns.iter().filter(|p| p.selects()).count(),
        files = matched.len(),
        "patterns resolved"
    );
    matched
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    let lower = path.to_lowercase();
    extensions.iter().any(|e| lower.ends_with(e))
}

/// Compile the globs that parse; `None` when none do.
fn build_globset<'a>(globs: impl Iterator<Item = &'a str>) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut any = false;
    for pattern in globs {
        match GlobBuilder::new(pattern).case_insensitive(true).build() {
            Ok(glob) => {
                builder.add(glob);
                any = true;
            }
            Err(e) => tracing::warn!(pattern, error = %e, "dropping invalid glob"),
        }
    }
    if !any {
        return None;
    }
    builder
        .build()
        .map_err(|e| tracing::warn!(error = %e, "glob set failed to build"))
        .ok()
}

/// A case-insensitive literal.
struct KeywordMatcher {
    lower: String,
    matcher: RegexMatcher,
}

impl KeywordMatcher {
    fn new(keyword: &str) -> Result<Self, ScanError> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(true)
            .fixed_strings(true)
            .build(keyword)
            .map_err(|e| ScanError::Pattern {
                pattern: keyword.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            lower: keyword.to_lowercase(),
            matcher,
        })
    }

    fn matches_path(&self, rel: &str) -> bool {
        rel.to_lowercase().contains(&self.lower)
    }

    fn matches_contents(&self, searcher: &mut Searcher, tree: &SourceTree, rel: &str) -> bool {
        let mut sink = FirstMatch::default();
        match searcher.search_path(&self.matcher, tree.absolute(rel), &mut sink) {
            Ok(()) => sink.found,
            Err(e) => {
                tracing::debug!(path = rel, error = %e, "keyword search failed");
                false
            }
        }
    }
}

/// Stops the search at the first hit.
#[derive(Default)]
struct FirstMatch {
    found: bool,
}

impl Sink for FirstMatch {
    type Error = io::Error;

    fn matched(&mut self, _searcher: &Searcher, _mat: &SinkMatch<'_>) -> Result<bool, io::Error> {
        self.found = true;
        Ok(false)
    }
}

/// Whether `keyword` appears in `text`, ignoring case.
#[must_use]
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    KeywordMatcher::new(keyword)
        .ok()
        .and_then(|k| k.matcher.is_match(text.as_bytes()).ok())
        .unwrap_or(false)
}
