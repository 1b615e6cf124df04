//! Diagnostic infrastructure for error reporting
//!
//! Renders parse and check errors with source context, either to a
//! terminal or as JSON for tooling.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use choco_parser::{ParseError, ParseErrorKind, Span};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use termcolor::{ColorChoice, NoColor, StandardStream};

use crate::error::CheckError;

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.inner = self.inner.with_code(code.0);
        self.code = Some(code);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(
        mut self,
        file_id: usize,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::primary(file_id, span.start..span.end).with_message(message);
        self.inner.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Create diagnostic from a CheckError
    pub fn from_check_error(error: &CheckError, file_id: usize) -> Self {
        use CheckError::*;

        let label = match error {
            UndefinedVariable { .. } => "not found in this scope".to_string(),
            UndefinedFunction { .. } => "no function, class or builtin with this name".to_string(),
            UndeclaredAssignment { .. } => "assigned here".to_string(),
            InvalidScopeDecl { kind, .. } => format!("not a {} variable", kind),
            UnknownField { .. } => "field not found".to_string(),
            UnknownMethod { .. } => "method not found".to_string(),
            UnresolvedCapture { .. } => "called here".to_string(),
            TypeMismatch {
                expected, actual, ..
            } => format!("expected '{}', found '{}'", expected, actual),
            InvalidBinaryOp { .. } | InvalidUnaryOp { .. } => "invalid operation".to_string(),
            ArgumentCountMismatch { .. } => "incorrect number of arguments".to_string(),
            NotAnObject { .. } => "not an object".to_string(),
            UndefinedType { .. } => "type not found".to_string(),
            MissingReturn { .. } => "missing return".to_string(),
            BadOverride { .. } => "incompatible override".to_string(),
            InvalidMethodSignature { .. } => "invalid signature".to_string(),
            InvalidInitializer { .. } => "wrong literal".to_string(),
            CannotPrint { .. } => "cannot be printed".to_string(),
            DuplicateIdentifier { .. } => "duplicate declaration".to_string(),
            DuplicateField { .. } => "re-declared here".to_string(),
            UnknownSuperclass { .. } => "unknown class".to_string(),
            InheritanceCycle { .. } => "cyclic inheritance".to_string(),
        };

        let diag = Diagnostic::error(error.to_string())
            .with_code(error_code(error))
            .with_primary_label(file_id, error.span(), label);

        match error {
            UndeclaredAssignment { name, .. } => {
                diag.with_help(format!("declare it with 'global {0}' or 'nonlocal {0}'", name))
            }
            TypeMismatch { actual, .. } if actual == "None" => {
                diag.with_note("None can only be stored in object-typed locations")
            }
            BadOverride { .. } => diag.with_note(
                "overrides keep the inherited parameter types and may narrow the return type",
            ),
            _ => diag,
        }
    }

    /// Create diagnostic from a ParseError
    pub fn from_parse_error(error: &ParseError, file_id: usize) -> Self {
        let label = match &error.kind {
            ParseErrorKind::UnexpectedToken { found, .. } => format!("unexpected '{}'", found),
            ParseErrorKind::InvalidSyntax { .. } => "invalid syntax".to_string(),
            ParseErrorKind::InvalidNumber { .. } => "out of range".to_string(),
            ParseErrorKind::DeclarationAfterStatement => "declaration after statement".to_string(),
            ParseErrorKind::Lex(_) => "invalid token".to_string(),
        };

        let diag = Diagnostic::error(error.message.clone())
            .with_code(parse_error_code(error))
            .with_primary_label(file_id, error.span, label);

        match &error.suggestion {
            Some(suggestion) => diag.with_help(suggestion.clone()),
            None => diag,
        }
    }

    /// Emit the diagnostic to stderr with colors
    pub fn emit(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Render the diagnostic without colors
    pub fn render(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<String, codespan_reporting::files::Error> {
        let mut writer = NoColor::new(Vec::new());
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Get the underlying codespan diagnostic
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for IDE integration
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// 1-indexed
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: Option<String>,
    /// `primary` or `secondary`
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;

                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Get error code for a CheckError
pub fn error_code(error: &CheckError) -> ErrorCode {
    use CheckError::*;

    match error {
        TypeMismatch { .. } => ErrorCode("E2001"),
        InvalidBinaryOp { .. } => ErrorCode("E2002"),
        InvalidUnaryOp { .. } => ErrorCode("E2003"),
        ArgumentCountMismatch { .. } => ErrorCode("E2004"),
        NotAnObject { .. } => ErrorCode("E2005"),
        UndefinedType { .. } => ErrorCode("E2006"),
        MissingReturn { .. } => ErrorCode("E2007"),
        BadOverride { .. } => ErrorCode("E2008"),
        InvalidMethodSignature { .. } => ErrorCode("E2009"),
        InvalidInitializer { .. } => ErrorCode("E2010"),
        CannotPrint { .. } => ErrorCode("E2011"),

        UndefinedVariable { .. } => ErrorCode("E3001"),
        UndefinedFunction { .. } => ErrorCode("E3002"),
        UndeclaredAssignment { .. } => ErrorCode("E3003"),
        InvalidScopeDecl { .. } => ErrorCode("E3004"),
        UnknownField { .. } => ErrorCode("E3005"),
        UnknownMethod { .. } => ErrorCode("E3006"),
        UnresolvedCapture { .. } => ErrorCode("E3007"),

        DuplicateIdentifier { .. } => ErrorCode("E4001"),
        DuplicateField { .. } => ErrorCode("E4002"),
        UnknownSuperclass { .. } => ErrorCode("E4003"),
        InheritanceCycle { .. } => ErrorCode("E4004"),
    }
}

/// Get error code for a ParseError
pub fn parse_error_code(error: &ParseError) -> ErrorCode {
    match error.kind {
        ParseErrorKind::UnexpectedToken { .. } => ErrorCode("E1001"),
        ParseErrorKind::InvalidSyntax { .. } => ErrorCode("E1002"),
        ParseErrorKind::InvalidNumber { .. } => ErrorCode("E1003"),
        ParseErrorKind::DeclarationAfterStatement => ErrorCode("E1004"),
        ParseErrorKind::Lex(_) => ErrorCode("E1005"),
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(
    path: impl Into<PathBuf>,
    source: impl Into<String>,
) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use choco_parser::parse;

    #[test]
    fn test_diagnostic_with_code() {
        let diag = Diagnostic::error("Test error").with_code(ErrorCode("E2001"));
        assert_eq!(diag.code(), Some(&ErrorCode("E2001")));
        assert_eq!(diag.inner().severity, Severity::Error);
    }

    #[test]
    fn test_codes_follow_category() {
        let span = Span::default();
        let reference = CheckError::UndefinedVariable {
            name: "x".into(),
            span,
        };
        let layout = CheckError::UnknownSuperclass {
            class: "A".into(),
            superclass: "B".into(),
            span,
        };
        assert!(error_code(&reference).as_str().starts_with("E3"));
        assert!(error_code(&layout).as_str().starts_with("E4"));
        assert!(error_code(&CheckError::mismatch("int", "bool", span))
            .as_str()
            .starts_with("E2"));
    }

    #[test]
    fn test_undeclared_assignment_help() {
        let error = CheckError::UndeclaredAssignment {
            name: "x".into(),
            span: Span::new(0, 1, 1, 1),
        };
        let diag = Diagnostic::from_check_error(&error, 0);
        assert!(diag.inner().notes.iter().any(|n| n.contains("nonlocal x")));
    }

    #[test]
    fn test_parse_error_diagnostic() {
        let error = parse("x = (1\n").unwrap_err();
        let diag = Diagnostic::from_parse_error(&error, 0);
        assert!(diag.code().unwrap().as_str().starts_with("E1"));
    }

    #[test]
    fn test_render_points_at_source() {
        let source = "x:int = 1\ny = 2\n";
        let files = create_files("main.choco", source);
        let error = CheckError::UndefinedVariable {
            name: "y".into(),
            span: Span::new(10, 11, 2, 1),
        };
        let rendered = Diagnostic::from_check_error(&error, 0).render(&files).unwrap();
        assert!(rendered.contains("E3001"));
        assert!(rendered.contains("main.choco:2:1"));
    }

    #[test]
    fn test_json_labels() {
        let files = create_files("main.choco", "x:int = 1\ny = 2\n");
        let error = CheckError::UndefinedVariable {
            name: "y".into(),
            span: Span::new(10, 11, 2, 1),
        };
        let json = Diagnostic::from_check_error(&error, 0)
            .to_json(&files)
            .unwrap();
        let parsed: JsonDiagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.code.as_deref(), Some("E3001"));
        assert_eq!(parsed.labels[0].start_line, 2);
        assert_eq!(parsed.labels[0].style, "primary");
    }
}
