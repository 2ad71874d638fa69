//! tinyc-sem — the semantic analyzer (§4.8-§4.9).
//!
//! Builds a [`SymbolTable`] while walking a parsed [`tinyc_par::Program`],
//! reporting every undefined name, redefinition, type mismatch, and
//! control-flow misuse the source grammar cannot rule out on its own.

pub mod analysis;
pub mod symbol_table;
pub mod types;

pub use analysis::{
    ExpressionType, SemanticAnalysisResult, SemanticAnalyzer, SemanticAnalyzerConfig,
    SemanticError, SemanticErrorKind,
};
pub use symbol_table::{Scope, ScopeId, SymbolInfo, SymbolKind, SymbolTable};
pub use types::DataType;

/// Analyzes a complete program with the standard (default) check
/// configuration, building a fresh [`SemanticAnalyzer`] each call.
/// Callers that need a custom [`SemanticAnalyzerConfig`] should
/// construct the analyzer directly.
pub fn analyze(program: &tinyc_par::Program) -> SemanticAnalysisResult {
    SemanticAnalyzer::new(SemanticAnalyzerConfig::standard()).analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_accepts_a_minimal_well_typed_program() {
        let parsed = tinyc_par::parse("int main() { return 0; }");
        assert!(parsed.success, "diagnostics: {:?}", parsed.diagnostics);
        let result = analyze(&parsed.ast.unwrap());
        assert!(result.success, "errors: {:?}", result.errors);
        assert_eq!(result.total_scopes, 2);
    }
}
