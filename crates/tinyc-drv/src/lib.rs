//! tinyc-drv — pipeline orchestrator and CLI driver (§5, §6).
//!
//! [`Pipeline`] is the core's sole external entry point: it threads a
//! source buffer through the lexer, parser, semantic analyzer, and IR
//! generator strictly in order, accumulating every stage's diagnostics
//! into one [`PipelineReport`] regardless of whether later stages run.
//! The core itself never touches the filesystem or the process exit
//! code — those live in `main.rs`, the thin CLI shell over this
//! library, matching how `faxc-drv`'s `Session` stays pure over bytes
//! while `faxc`'s `main.rs` owns argv/exit status.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tinyc_ir::{generate_with_diagnostics, CodeGenResult};
use tinyc_par::{Parser, ParseResult};
use tinyc_sem::{SemanticAnalysisResult, SemanticAnalyzer, SemanticAnalyzerConfig};
use tinyc_util::{Diagnostic, Level};

/// An `AtomicBool`-backed cancellation handle (§5 "cancellation-polite
/// at stage boundaries only"). Cloning shares the same underlying flag;
/// setting it from any clone is observed by the pipeline the next time
/// it checks between stages — never inside one.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Knobs threaded explicitly through every stage (§5 "no global mutable
/// state"). `semantic` selects the analyzer's check set (`standard` by
/// default, matching `SemanticAnalyzerConfig::standard()`); `ir_comments`
/// turns on the generator's §4.10 region-naming `nop` comments.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub semantic: SemanticAnalyzerConfig,
    pub ir_comments: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            semantic: SemanticAnalyzerConfig::standard(),
            ir_comments: false,
        }
    }
}

/// Which stages a [`Pipeline::run`] call actually reached before either
/// finishing or being cancelled (§5 cancellation stops "producing
/// further stages").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageReached {
    Lexical,
    Syntax,
    Semantic,
    CodeGen,
}

/// The full result of one `Pipeline::run` call: every stage's own
/// result record (§6), plus the flattened, uniformly-rendered
/// diagnostic list a driver actually prints.
#[derive(Debug)]
pub struct PipelineReport {
    pub lexical: tinyc_lex::LexicalResult,
    pub parse: Option<ParseResult>,
    pub semantic: Option<SemanticAnalysisResult>,
    pub codegen: Option<CodeGenResult>,
    pub stage_reached: StageReached,
    pub cancelled: bool,
}

impl PipelineReport {
    /// `true` only if every stage that ran reported no errors. A
    /// pipeline stopped early by cancellation is never `success` —
    /// there is no IR to consume (§6 "downstream stages consume the
    /// preceding stage's output only if it succeeded").
    pub fn success(&self) -> bool {
        if self.cancelled {
            return false;
        }
        self.lexical.success
            && self.parse.as_ref().map_or(false, |p| p.success)
            && self.semantic.as_ref().map_or(false, |s| s.success)
            && self.codegen.as_ref().map_or(false, |c| c.success)
    }

    /// `true` if any stage that ran reported at least one error —
    /// the exit-code-1 condition of §6's command-line surface.
    pub fn has_errors(&self) -> bool {
        !self.lexical.success
            || self.parse.as_ref().map_or(false, |p| !p.success)
            || self.semantic.as_ref().map_or(false, |s| !s.success)
            || self.codegen.as_ref().map_or(false, |c| !c.success)
    }

    /// Every diagnostic from every stage that ran, rendered through the
    /// shared [`Diagnostic`] model in stage order (§6 "the driver prints
    /// the full diagnostic list for any stage whose success is false.
    /// Warnings are always printed").
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        out.extend(self.lexical.errors.iter().map(|e| e.to_diagnostic()));
        if let Some(parse) = &self.parse {
            out.extend(parse.diagnostics.iter().cloned());
        }
        if let Some(sem) = &self.semantic {
            out.extend(sem.errors.iter().map(|e| e.to_diagnostic(Level::Error)));
            out.extend(sem.warnings.iter().map(|e| e.to_diagnostic(Level::Warning)));
        }
        if let Some(codegen) = &self.codegen {
            out.extend(codegen.errors.iter().cloned());
            out.extend(codegen.warnings.iter().cloned());
        }
        out
    }
}

/// Runs the four core stages in strict sequence over one source
/// buffer. Owns nothing across calls to [`Pipeline::run`] except the
/// parser's prebuilt grammar/table — `tinyc_par::Parser::new()` does
/// real work (LALR table construction) so a long-lived driver should
/// build one `Pipeline` and call `run` on it repeatedly rather than
/// constructing a fresh one per file.
pub struct Pipeline {
    parser: Parser,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline {
            parser: Parser::new(),
            config,
        }
    }

    /// Runs lexer → parser → semantic analyzer → IR generator over
    /// `source`, checking `token` only between stages (§5). A set
    /// token stops the pipeline before the next stage starts; stages
    /// that already ran keep their results and diagnostics.
    pub fn run(&self, source: &str, token: &CancellationToken) -> PipelineReport {
        let lexical = tinyc_lex::Lexer::new(source).analyze();
        if token.is_cancelled() {
            return PipelineReport {
                lexical,
                parse: None,
                semantic: None,
                codegen: None,
                stage_reached: StageReached::Lexical,
                cancelled: true,
            };
        }

        let parse = self.parser.parse(&lexical.tokens);
        if token.is_cancelled() {
            return PipelineReport {
                lexical,
                parse: Some(parse),
                semantic: None,
                codegen: None,
                stage_reached: StageReached::Syntax,
                cancelled: true,
            };
        }

        let ast = match (lexical.success, parse.success, &parse.ast) {
            (true, true, Some(ast)) => Some(ast.clone()),
            _ => None,
        };

        let semantic = ast
            .as_ref()
            .map(|ast| SemanticAnalyzer::new(self.config.semantic).analyze(ast));

        if token.is_cancelled() {
            return PipelineReport {
                lexical,
                parse: Some(parse),
                semantic,
                codegen: None,
                stage_reached: StageReached::Semantic,
                cancelled: true,
            };
        }

        let codegen = match (&ast, &semantic) {
            (Some(ast), Some(sem)) if sem.success => {
                Some(generate_with_diagnostics(ast, self.config.ir_comments))
            }
            _ => None,
        };

        PipelineReport {
            lexical,
            parse: Some(parse),
            semantic,
            codegen,
            stage_reached: StageReached::CodeGen,
            cancelled: false,
        }
    }
}

/// Renders a diagnostic the way §6 specifies, delegating to
/// [`Diagnostic`]'s own `Display` impl — kept here as the single call
/// site a driver needs, so `main.rs` never has to know the format.
pub fn render_diagnostic(diag: &Diagnostic) -> String {
    diag.to_string()
}

/// Renders the full stdout contract of §6: "the diagnostics summary
/// followed by the IR textual form." Returns an empty trailing IR
/// section when code generation never ran.
pub fn render_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    for diag in report.diagnostics() {
        out.push_str(&render_diagnostic(&diag));
        out.push('\n');
    }
    if let Some(codegen) = &report.codegen {
        for instr in &codegen.ir.instructions {
            out.push_str(&instr.to_string());
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyc_util::Category;

    #[test]
    fn a_well_typed_program_succeeds_through_every_stage() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let token = CancellationToken::new();
        let report = pipeline.run("int main() { int x = 3 + 5 * 2; return x; }", &token);
        assert!(report.success(), "diagnostics: {:?}", report.diagnostics());
        assert_eq!(report.stage_reached, StageReached::CodeGen);
        assert!(!report.codegen.as_ref().unwrap().ir.instructions.is_empty());
    }

    #[test]
    fn an_undefined_variable_is_reported_and_stops_before_codegen() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let token = CancellationToken::new();
        let report = pipeline.run("int main() { int a = 5; b = a + 3; return 0; }", &token);
        assert!(!report.success());
        assert!(report.has_errors());
        assert!(report.codegen.is_none());
        let rendered = report.diagnostics();
        assert!(rendered.iter().any(|d| d.category == Category::Semantic));
    }

    #[test]
    fn a_lex_error_still_lets_diagnostics_be_collected() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let token = CancellationToken::new();
        let report = pipeline.run("int x = 1 @ 2;", &token);
        assert!(!report.lexical.success);
        assert!(report.has_errors());
    }

    #[test]
    fn cancelling_before_the_run_stops_after_the_lexer() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let token = CancellationToken::new();
        token.cancel();
        let report = pipeline.run("int main() { return 0; }", &token);
        assert!(report.cancelled);
        assert_eq!(report.stage_reached, StageReached::Lexical);
        assert!(report.parse.is_none());
    }

    #[test]
    fn render_report_prints_diagnostics_before_ir() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let token = CancellationToken::new();
        let report = pipeline.run("int main() { int x = 1; return x; }", &token);
        let rendered = render_report(&report);
        assert!(rendered.contains("return"));
    }

    #[test]
    fn missing_return_is_reported_as_a_semantic_error() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let token = CancellationToken::new();
        let report = pipeline.run("int f() { int x = 1; }", &token);
        assert!(!report.success());
        assert!(report
            .semantic
            .as_ref()
            .unwrap()
            .errors
            .iter()
            .any(|e| e.kind == tinyc_sem::SemanticErrorKind::MissingReturn));
    }
}
