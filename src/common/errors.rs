// Copyright (c) 2016-2020 Fabian Schuiki

//! Utilities to implement diagnostics and error reporting facilities.

use crate::source::Span;
use std::cell::{Cell, RefCell};
use std::fmt;

/// Emits diagnostic messages.
pub trait DiagEmitter {
    /// Emit a diagnostic message.
    fn emit(&self, diag: DiagBuilder2);
}

impl<'a, T> DiagEmitter for &'a T
where
    T: DiagEmitter + ?Sized,
{
    fn emit(&self, diag: DiagBuilder2) {
        (*self).emit(diag)
    }
}

#[must_use]
#[derive(Clone, Debug)]
pub struct DiagBuilder2 {
    pub severity: Severity,
    pub message: String,
    pub segments: Vec<DiagSegment>,
}

#[derive(Clone, Debug)]
pub enum DiagSegment {
    Span(Span),
    Note(String),
}

/// A diagnostic result type. Either carries the result `T` in the Ok variant,
/// or an assembled diagnostic in the Err variant.
pub type DiagResult2<T> = Result<T, DiagBuilder2>;

impl DiagBuilder2 {
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> DiagBuilder2 {
        DiagBuilder2 {
            severity,
            message: message.into(),
            segments: Vec::new(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Error, message)
    }

    pub fn warning<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Warning, message)
    }

    pub fn note<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Note, message)
    }

    pub fn segment(self, segment: DiagSegment) -> DiagBuilder2 {
        let mut segments = self.segments;
        segments.push(segment);
        DiagBuilder2 { segments, ..self }
    }

    pub fn span<S: Into<Span>>(self, span: S) -> DiagBuilder2 {
        self.segment(DiagSegment::Span(span.into()))
    }

    pub fn add_note<S: Into<String>>(self, message: S) -> DiagBuilder2 {
        self.segment(DiagSegment::Note(message.into()))
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn get_message(&self) -> &String {
        &self.message
    }

    pub fn get_segments(&self) -> &[DiagSegment] {
        &self.segments
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl Severity {
    pub fn to_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl fmt::Display for DiagBuilder2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut colorcode = match self.get_severity() {
            Severity::Error => "\x1B[31;1m",
            Severity::Warning => "\x1B[33;1m",
            Severity::Note => "\x1B[36;1m",
        };
        writeln!(
            f,
            "{}{}:\x1B[m\x1B[1m {}\x1B[m",
            colorcode,
            self.get_severity(),
            self.get_message()
        )?;

        for segment in &self.segments {
            match *segment {
                // Spans without a source carry no location to point at.
                DiagSegment::Span(sp) if !sp.source.is_valid() => (),
                DiagSegment::Span(sp) => {
                    let content = sp.source.get_content();
                    let (line, col, line_offset) = sp.begin().human();
                    let text: String = content.as_str()[line_offset..]
                        .chars()
                        .take_while(|c| *c != '\n' && *c != '\r')
                        .collect();
                    let width = content.as_str()[sp.begin..sp.end].chars().count();
                    writeln!(
                        f,
                        "  --> {}:{}:{}-{}:",
                        sp.source.get_path(),
                        line,
                        col,
                        col + width
                    )?;
                    writeln!(f, "   | ")?;

                    // Print the line in question, highlighting the span.
                    write!(f, "   | ")?;
                    for (i, c) in text.char_indices() {
                        let i = i + line_offset;
                        if sp.begin != sp.end {
                            if i == sp.begin {
                                write!(f, "{}", colorcode)?;
                            }
                            if i == sp.end {
                                write!(f, "\x1B[m")?;
                            }
                        }
                        match c {
                            '\t' => write!(f, "    ")?,
                            c => write!(f, "{}", c)?,
                        }
                    }
                    writeln!(f, "\x1B[m")?;

                    // Print the caret markers for the line in question.
                    write!(f, "   | ")?;
                    let mut pd = ' ';
                    for (i, c) in text.char_indices() {
                        let i = i + line_offset;
                        let d = if (i >= sp.begin && i < sp.end)
                            || (i == sp.begin && sp.begin == sp.end)
                        {
                            '^'
                        } else {
                            ' '
                        };
                        if d != pd {
                            write!(f, "{}", if d == ' ' { "\x1B[m" } else { colorcode })?;
                        }
                        pd = d;
                        match c {
                            '\t' => write!(f, "{}{}{}{}", d, d, d, d)?,
                            _ => write!(f, "{}", d)?,
                        }
                    }
                    writeln!(f, "\x1B[m")?;
                    colorcode = "\x1B[1m";
                }
                DiagSegment::Note(ref message) => {
                    writeln!(f, "   = \x1B[1mnote:\x1B[m {}", message)?
                }
            }
        }

        Ok(())
    }
}

/// A diagnostic emitter that keeps every message it receives, and tracks the
/// worst severity seen so far.
#[derive(Debug)]
pub struct DiagCollector {
    diags: RefCell<Vec<DiagBuilder2>>,
    severity: Cell<Severity>,
}

impl DiagCollector {
    pub fn new() -> DiagCollector {
        DiagCollector {
            diags: RefCell::new(Vec::new()),
            severity: Cell::new(Severity::Note),
        }
    }

    /// Get the severity of the worst diagnostic emitted so far.
    pub fn severity(&self) -> Severity {
        self.severity.get()
    }

    /// Check whether an error diagnostic has been emitted.
    pub fn is_error(&self) -> bool {
        self.len_at_least(Severity::Error) > 0
    }

    /// Count the diagnostics of the given severity or worse.
    pub fn len_at_least(&self, severity: Severity) -> usize {
        self.diags
            .borrow()
            .iter()
            .filter(|d| d.get_severity() >= severity)
            .count()
    }

    /// Count the diagnostics of exactly the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diags
            .borrow()
            .iter()
            .filter(|d| d.get_severity() == severity)
            .count()
    }

    /// Remove and return all diagnostics collected so far.
    pub fn take(&self) -> Vec<DiagBuilder2> {
        self.severity.set(Severity::Note);
        std::mem::replace(&mut *self.diags.borrow_mut(), Vec::new())
    }

    /// Get a copy of the messages collected so far.
    pub fn messages(&self) -> Vec<String> {
        self.diags
            .borrow()
            .iter()
            .map(|d| d.get_message().clone())
            .collect()
    }
}

impl Default for DiagCollector {
    fn default() -> DiagCollector {
        DiagCollector::new()
    }
}

impl DiagEmitter for DiagCollector {
    fn emit(&self, diag: DiagBuilder2) {
        use std::cmp::max;
        self.severity.set(max(self.severity.get(), diag.get_severity()));
        self.diags.borrow_mut().push(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::get_source_manager;

    #[test]
    fn collector_tracks_severity() {
        let diag = DiagCollector::new();
        diag.emit(DiagBuilder2::warning("table collision"));
        assert_eq!(diag.severity(), Severity::Warning);
        assert!(!diag.is_error());
        diag.emit(DiagBuilder2::error("expected `;`"));
        assert_eq!(diag.severity(), Severity::Error);
        assert!(diag.is_error());
        assert_eq!(diag.count(Severity::Warning), 1);
        assert_eq!(diag.len_at_least(Severity::Warning), 2);
        assert_eq!(diag.take().len(), 2);
        assert!(!diag.is_error());
    }

    #[test]
    fn render_with_span() {
        let source = get_source_manager().add("render.pas", "x := := 1;\n");
        let diag = DiagBuilder2::error("expected expression, found `:=`")
            .span(crate::source::Span::new(source, 5, 7))
            .add_note("skipped during recovery");
        let text = format!("{}", diag);
        assert!(text.contains("render.pas:1:6-8"));
        assert!(text.contains("x := := 1;"));
        assert!(text.contains("note:"));
    }
}
