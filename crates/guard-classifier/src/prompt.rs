//! Prompt construction for the classifier, hint, and brief calls.

use std::fmt::Write as _;

use crate::classifier::ChunkRequest;
use crate::hints::HintRequest;
use crate::model::ModelRequest;

/// Violations quoted back to the model when asking for refinements.
const MAX_PRIOR_VIOLATIONS: usize = 10;

const AUDITOR_SYSTEM: &str = "You are a meticulous code compliance auditor. \
You only report code that clearly breaks a listed requirement.";

/// Prompt asking whether one chunk violates the brief.
#[must_use]
pub fn classify(request: &ChunkRequest) -> ModelRequest {
    let chunk = &request.chunk;
    let prompt = format!(
        "Requirements:\n{brief}\n\n\
         Code from {file}, lines {start}-{end}. Each line is prefixed with its \
         position inside this snippet.\n\
         ```{lang}\n{code}\n```\n\n\
         Reply with a JSON array. For each violation add an object with the keys \
         \"line\" (the snippet position of the offending line), \"violating_code\", \
         \"explanation\" and \"rule_violated\" (the requirement text). \
         Reply with [] when the snippet complies.",
        brief = request.brief.render(),
        file = chunk.file_path,
        start = chunk.start_line,
        end = chunk.end_line,
        lang = request.language,
        code = chunk.numbered_text(),
    );
    ModelRequest::new(prompt)
        .with_system(AUDITOR_SYSTEM)
        .expect_json()
}

/// Prompt asking where to look. First pass when `prior` is empty,
/// refinement from findings otherwise.
#[must_use]
pub fn hints(request: &HintRequest) -> ModelRequest {
    let brief = request.brief.render();
    let prompt = if request.prior.is_empty() {
        format!(
            "Requirements:\n{brief}\n\n\
             Which source files in a typical repository are most likely to break \
             these requirements? Reply with a JSON object with the keys \
             \"extensions\" (file extensions such as \".py\"), \"globs\" (path globs \
             such as \"**/auth/**\") and \"keywords\" (short literal strings that \
             appear in offending code, such as \"password\" or \"http://\")."
        )
    } else {
        let shown = &request.prior[..request.prior.len().min(MAX_PRIOR_VIOLATIONS)];
        let mut listing = String::new();
        for v in shown {
            let _ = writeln!(
                listing,
                "- {}:{} [{}] {} ({})",
                v.file, v.line, v.rule_violated, v.violating_code, v.explanation
            );
        }
        format!(
            "Requirements:\n{brief}\n\n\
             A first scan found these violations:\n{listing}\n\
             Suggest more places where similar violations may hide. Reply with a \
             JSON object with the keys \"refined_patterns\" (short literal strings \
             to search for in code) and \"globs\" (path globs)."
        )
    };
    ModelRequest::new(prompt).expect_json()
}

/// Prompt answering a question from retrieved regulatory context.
#[must_use]
pub fn brief(question: &str, context: &[String]) -> ModelRequest {
    let prompt = format!(
        "Answer the question using only the regulatory text below.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer as a list of concrete technical requirements a code base must \
         meet, one requirement per line, each starting with \"- \".",
        context = context.join("\n\n"),
    );
    ModelRequest::new(prompt)
}
