//! Diagnostic records.
//!
//! A diagnostic is a format template, a list of typed arguments, and the
//! source range it applies to. Passes accumulate them in plain vectors;
//! nothing here is fatal. Rendering substitutes each `{}` in the template
//! with the next argument.

use std::fmt;

use crate::location::Location;

/// One argument attached to a diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub enum DiagArg {
    Text(String),
    Int(i64),
}

impl From<&str> for DiagArg {
    fn from(s: &str) -> Self {
        DiagArg::Text(s.to_string())
    }
}

impl From<String> for DiagArg {
    fn from(s: String) -> Self {
        DiagArg::Text(s)
    }
}

impl From<i64> for DiagArg {
    fn from(v: i64) -> Self {
        DiagArg::Int(v)
    }
}

impl From<usize> for DiagArg {
    fn from(v: usize) -> Self {
        DiagArg::Int(v as i64)
    }
}

impl fmt::Display for DiagArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagArg::Text(s) => f.write_str(s),
            DiagArg::Int(v) => write!(f, "{v}"),
        }
    }
}

/// A diagnostic: template + typed arguments + range.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub format: &'static str,
    pub args: Vec<DiagArg>,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(format: &'static str, location: Location) -> Self {
        Diagnostic {
            format,
            args: Vec::new(),
            location,
        }
    }

    /// Append an argument, builder style.
    pub fn arg(mut self, value: impl Into<DiagArg>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Append an argument in place, for diagnostics already pushed to a list.
    pub fn push_arg(&mut self, value: impl Into<DiagArg>) -> &mut Self {
        self.args.push(value.into());
        self
    }

    /// The rendered message with arguments substituted for `{}`.
    pub fn message(&self) -> String {
        let mut out = String::with_capacity(self.format.len());
        let mut args = self.args.iter();
        let mut rest = self.format;
        while let Some(idx) = rest.find("{}") {
            out.push_str(&rest[..idx]);
            match args.next() {
                Some(a) => out.push_str(&a.to_string()),
                None => out.push_str("{}"),
            }
            rest = &rest[idx + 2..];
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_without_placeholders() {
        let d = Diagnostic::new("design file is empty", Location::default());
        assert_eq!(d.message(), "design file is empty");
    }

    #[test]
    fn message_substitutes_arguments_in_order() {
        let d = Diagnostic::new("expected '{}' before '{}'", Location::default())
            .arg(";")
            .arg("end");
        assert_eq!(d.message(), "expected ';' before 'end'");
    }

    #[test]
    fn missing_argument_leaves_placeholder() {
        let d = Diagnostic::new("skipping '{}'", Location::default());
        assert_eq!(d.message(), "skipping '{}'");
    }

    #[test]
    fn integer_arguments_render() {
        let d = Diagnostic::new("ignoring {} errors", Location::default()).arg(3usize);
        assert_eq!(d.message(), "ignoring 3 errors");
    }
}
