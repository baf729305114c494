//! Candidate selection: which files deserve the classifier's attention.
//!
//! Keywords come from the brief itself (tokenised, stop-words removed,
//! expanded through a small concept table). A [`HintSource`] may add globs and
//! keywords; if it fails or says nothing, selection is purely deterministic.

use std::collections::BTreeSet;
use std::sync::Arc;

use guard_classifier::{HintRequest, HintSource, Hints};
use guard_core::ComplianceBrief;
use guard_core::entities::{CandidatePattern, Violation};

/// Tokens shorter than this are never keywords.
const MIN_KEYWORD_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "has", "have", "had",
    "was", "were", "with", "this", "that", "these", "those", "from", "into", "onto", "than",
    "then", "when", "where", "which", "while", "what", "who", "whom", "why", "how", "must",
    "shall", "should", "will", "would", "may", "might", "could", "use", "used", "uses", "using",
    "been", "being", "before", "after", "over", "under", "each", "every", "only", "also", "such",
    "other", "more", "most", "less", "least", "higher", "lower", "above", "below", "their",
    "there", "they", "them", "its", "our", "your", "per", "via", "never", "always", "ensure",
    "ensures", "required", "requires", "require", "without", "within", "between", "data",
    "system", "systems", "minimum", "maximum",
];

/// Concept stems and the related terms they pull in.
const CONCEPTS: &[(&str, &[&str])] = &[
    ("password", &["auth", "login", "credential", "passwd"]),
    ("credential", &["auth", "secret", "token"]),
    ("authenticat", &["auth", "login", "session"]),
    ("tls", &["ssl", "https", "certificate"]),
    ("ssl", &["tls", "https", "certificate"]),
    ("encrypt", &["crypto", "cipher", "aes"]),
    ("hash", &["bcrypt", "argon2", "sha256"]),
    ("secret", &["token", "api_key", "credential"]),
    ("token", &["jwt", "session", "auth"]),
    ("log", &["logger", "logging"]),
    ("personal", &["pii", "email", "address"]),
    ("consent", &["cookie", "tracking", "gdpr"]),
    ("cookie", &["consent", "session"]),
    ("sql", &["query", "execute", "cursor"]),
    ("inject", &["query", "execute", "eval"]),
    ("upload", &["file", "multipart"]),
    ("hardcod", &["config", "constant"]),
];

/// Language noise that would match nearly every file.
const CODE_NOISE: &[&str] = &[
    "def", "let", "var", "const", "function", "return", "import", "from", "self", "this", "true",
    "false", "none", "null", "nil", "new", "class", "public", "private", "static", "void", "int",
    "str", "string", "async", "await", "print", "println",
];

/// Source extensions recognised in free-text file references.
const REFERENCE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "html", "css", "cpp", "c", "h", "go", "rb", "php",
    "swift", "kt", "rs",
];

/// Lowercase alphanumeric tokens of `text` that are long enough and not
/// stop-words. Plural `-s` is trimmed from longer words.
fn tokens<'a>(
    text: &'a str,
    noise: &'static [&'static str],
) -> impl Iterator<Item = String> + 'a {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit() || c == '_'))
        .filter(move |t| !STOPWORDS.contains(&t.as_str()) && !noise.contains(&t.as_str()))
        .map(|t| singular(&t))
}

fn singular(token: &str) -> String {
    if token.len() > 4 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Keywords for one statement: its tokens plus concept expansions.
#[must_use]
pub fn statement_keywords(statement: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for token in tokens(statement, &[]) {
        for (stem, related) in CONCEPTS {
            if token.starts_with(stem) {
                out.extend(related.iter().map(|r| (*r).to_string()));
            }
        }
        out.insert(token);
    }
    out
}

/// Paths such as `src/auth.py` mentioned in free text, as globs.
fn file_references(text: &str) -> impl Iterator<Item = CandidatePattern> + '_ {
    text.split(|c: char| c.is_whitespace() || "'\"`()[]{},;:<>".contains(c))
        .map(|t| t.trim_matches(|c: char| c == '.' || c == '/'))
        .filter(|t| {
            t.rsplit_once('.').is_some_and(|(stem, ext)| {
                !stem.is_empty() && REFERENCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
            })
        })
        .filter(|t| !t.contains("://"))
        .map(|t| CandidatePattern::glob(format!("**/{t}")))
}

/// Derives candidate patterns from a brief and, for discovery, from the
/// violations of the first pass.
#[derive(Debug, Clone, Default)]
pub struct CandidateSelector<H> {
    hints: H,
}

impl<H: HintSource> CandidateSelector<H> {
    pub const fn new(hints: H) -> Self {
        Self { hints }
    }

    /// Patterns for the first pass. May be empty.
    pub async fn initial(&self, brief: &Arc<ComplianceBrief>) -> BTreeSet<CandidatePattern> {
        let mut patterns: BTreeSet<CandidatePattern> = brief
            .iter()
            .flat_map(|s| statement_keywords(s))
            .map(CandidatePattern::keyword)
            .collect();
        self.add_hints(brief, Vec::new(), &mut patterns).await;
        tracing::debug!(patterns = patterns.len(), "initial candidate patterns");
        patterns
    }

    /// Patterns for discovery. With no prior violations the search broadens
    /// to every eligible file.
    pub async fn refine(
        &self,
        brief: &Arc<ComplianceBrief>,
        prior: &[Violation],
    ) -> BTreeSet<CandidatePattern> {
        if prior.is_empty() {
            tracing::debug!("no prior violations; broadening to every file");
            return BTreeSet::from([CandidatePattern::Everything]);
        }

        let mut patterns = BTreeSet::new();
        for v in prior {
            patterns.extend(file_references(&v.explanation));
            patterns.extend(file_references(&v.violating_code));
            patterns.extend(tokens(&v.violating_code, CODE_NOISE).map(CandidatePattern::keyword));
            patterns.extend(
                statement_keywords(&v.rule_violated)
                    .into_iter()
                    .map(CandidatePattern::keyword),
            );
        }
        self.add_hints(brief, prior.to_vec(), &mut patterns).await;
        tracing::debug!(patterns = patterns.len(), "refined candidate patterns");
        patterns
    }

    async fn add_hints(
        &self,
        brief: &Arc<ComplianceBrief>,
        prior: Vec<Violation>,
        patterns: &mut BTreeSet<CandidatePattern>,
    ) {
        let request = HintRequest {
            brief: Arc::clone(brief),
            prior,
        };
        match self.hints.suggest(&request).await {
            Ok(Hints {
                globs,
                keywords,
                extensions,
            }) => {
                patterns.extend(globs.into_iter().map(CandidatePattern::Glob));
                patterns.extend(keywords.iter().map(CandidatePattern::keyword));
                patterns.extend(extensions.iter().map(CandidatePattern::extension));
            }
            Err(e) => tracing::warn!(error = %e, "hint source failed; using derived patterns only"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guard_classifier::{ClassifierError, NoHints};
    use guard_core::enums::ScanPass;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn brief(statements: &[&str]) -> Arc<ComplianceBrief> {
        Arc::new(ComplianceBrief::new(statements.iter().copied()))
    }

    fn keywords(patterns: &BTreeSet<CandidatePattern>) -> Vec<&str> {
        patterns
            .iter()
            .filter_map(|p| match p {
                CandidatePattern::Keyword(k) => Some(k.as_str()),
                _ => None,
            })
            .collect()
    }

    #[rstest]
    #[case("Passwords must be hashed before storage", &["argon2", "auth", "bcrypt", "credential", "hashed", "login", "passwd", "password", "sha256", "storage"])]
    #[case("Must use TLS 1.2 or higher", &["certificate", "https", "ssl", "tls"])]
    #[case("a b of", &[])]
    fn derived_keywords(#[case] statement: &str, #[case] expected: &[&str]) {
        let got: Vec<String> = statement_keywords(statement).into_iter().collect();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn initial_is_deterministic_without_hints() {
        let selector = CandidateSelector::new(NoHints);
        let b = brief(&["Must use TLS 1.2 or higher"]);
        let first = selector.initial(&b).await;
        assert_eq!(first, selector.initial(&b).await);
        assert_eq!(keywords(&first), ["certificate", "https", "ssl", "tls"]);
    }

    #[tokio::test]
    async fn refine_without_findings_broadens() {
        let selector = CandidateSelector::new(NoHints);
        let refined = selector.refine(&brief(&["Use TLS"]), &[]).await;
        assert_eq!(refined, BTreeSet::from([CandidatePattern::Everything]));
    }

    #[tokio::test]
    async fn refine_uses_references_identifiers_and_rules() {
        let selector = CandidateSelector::new(NoHints);
        let prior = vec![Violation {
            file: "auth.py".into(),
            line: 10,
            violating_code: "password = req.form['password']".into(),
            explanation: "Same pattern as utils/store.py: stored in plain text.".into(),
            rule_violated: "Passwords must be hashed".into(),
            pass: ScanPass::First,
        }];
        let refined = selector.refine(&brief(&["Passwords must be hashed"]), &prior).await;
        assert!(refined.contains(&CandidatePattern::glob("**/utils/store.py")));
        assert!(refined.contains(&CandidatePattern::keyword("form")));
        assert!(refined.contains(&CandidatePattern::keyword("req")));
        assert!(refined.contains(&CandidatePattern::keyword("bcrypt")));
        assert!(!refined.contains(&CandidatePattern::Everything));
    }

    struct Failing;

    impl HintSource for Failing {
        async fn suggest(&self, _r: &HintRequest) -> Result<Hints, ClassifierError> {
            Err(ClassifierError::Parse("nonsense".into()))
        }
    }

    struct Fixed;

    impl HintSource for Fixed {
        async fn suggest(&self, r: &HintRequest) -> Result<Hints, ClassifierError> {
            Ok(Hints {
                globs: vec!["**/*.cfg.py".into()],
                keywords: vec![(if r.prior.is_empty() { "VERIFY=False" } else { "urllib" }).into()],
                extensions: vec![".py".into()],
            })
        }
    }

    #[tokio::test]
    async fn failed_hints_contribute_nothing() {
        let b = brief(&["Must use TLS 1.2 or higher"]);
        let plain = CandidateSelector::new(NoHints).initial(&b).await;
        assert_eq!(CandidateSelector::new(Failing).initial(&b).await, plain);
    }

    #[tokio::test]
    async fn hints_are_merged() {
        let b = brief(&["Must use TLS 1.2 or higher"]);
        let patterns = CandidateSelector::new(Fixed).initial(&b).await;
        assert!(patterns.contains(&CandidatePattern::glob("**/*.cfg.py")));
        assert!(patterns.contains(&CandidatePattern::keyword("verify=false")));
        assert!(patterns.contains(&CandidatePattern::extension(".py")));
        assert!(!patterns.contains(&CandidatePattern::glob("**/*.py")));
    }
}
