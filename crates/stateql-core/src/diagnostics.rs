use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity level for parse diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Stable classification of everything the parser can complain about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// Field line is not of the `name is type` shape.
    MalformedFieldDeclaration,
    /// A `many`/`action` field lacks a valid `thru` clause.
    MalformedRelationshipClause,
    /// Type name has no column mapping and falls back to TEXT.
    UnknownPrimitiveType,
    /// A field line appears before any entity header.
    FieldWithoutEntity,
    UnbalancedParentheses,
    UnterminatedString,
    /// An action argument token was dropped.
    IgnoredArgument,
    EmptyEntityName,
    InvalidIdentifier,
    DuplicateEntity,
    DuplicateField,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::MalformedFieldDeclaration => "malformed_field_declaration",
            DiagnosticCode::MalformedRelationshipClause => "malformed_relationship_clause",
            DiagnosticCode::UnknownPrimitiveType => "unknown_primitive_type",
            DiagnosticCode::FieldWithoutEntity => "field_without_entity",
            DiagnosticCode::UnbalancedParentheses => "unbalanced_parentheses",
            DiagnosticCode::UnterminatedString => "unterminated_string",
            DiagnosticCode::IgnoredArgument => "ignored_argument",
            DiagnosticCode::EmptyEntityName => "empty_entity_name",
            DiagnosticCode::InvalidIdentifier => "invalid_identifier",
            DiagnosticCode::DuplicateEntity => "duplicate_entity",
            DiagnosticCode::DuplicateField => "duplicate_field",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Located parse issue with an optional hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    /// 1-based source line.
    pub line: usize,
    pub message: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            line,
            message: message.into(),
            hint: None,
        }
    }

    pub fn warning(code: DiagnosticCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            line,
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a hint describing how to fix the source.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "line {}: {level}[{}]: {}", self.line, self.code, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

/// Aggregated parse report with errors and warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ParseReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Route a diagnostic to the matching list.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ParseReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// All diagnostics ordered by source line, errors first on ties.
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut all: Vec<&Diagnostic> = self.errors.iter().chain(&self.warnings).collect();
        all.sort_by_key(|diagnostic| (diagnostic.line, diagnostic.severity == Severity::Warning));
        all
    }

    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|diagnostic| diagnostic.code == code)
    }
}

impl fmt::Display for ParseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sorted().into_iter().find(|d| d.severity == Severity::Error) {
            Some(first) if self.errors.len() > 1 => {
                write!(f, "{first} (and {} more error(s))", self.errors.len() - 1)
            }
            Some(first) => write!(f, "{first}"),
            None => write!(f, "no errors ({} warning(s))", self.warnings.len()),
        }
    }
}

impl std::error::Error for ParseReport {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_routes_by_severity() {
        let mut report = ParseReport::default();
        report.push(Diagnostic::error(DiagnosticCode::FieldWithoutEntity, 1, "orphan"));
        report.push(Diagnostic::warning(DiagnosticCode::UnknownPrimitiveType, 2, "json"));

        assert!(!report.is_ok());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn display_names_first_error_and_count() {
        let mut report = ParseReport::default();
        report.push(Diagnostic::error(DiagnosticCode::DuplicateField, 7, "dup"));
        report.push(
            Diagnostic::error(DiagnosticCode::MalformedFieldDeclaration, 3, "bad line")
                .with_hint("use `name is type`"),
        );

        assert_eq!(
            report.to_string(),
            "line 3: error[malformed_field_declaration]: bad line (hint: use `name is type`) (and 1 more error(s))"
        );
    }
}
