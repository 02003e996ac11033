//! User-facing errors that point into the text a player typed.
//!
//! An [`Error`] pairs the offending regions of the input with a boxed [`ErrorKind`], and the kind
//! turns those regions into an [`ariadne`] report.

use ariadne::{Color, Report, Source};
use std::{fmt::Debug, io, ops::Range};

/// Highlight color for expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Highlight color for dice.
pub const DICE: Color = Color::RGB(235, 152, 52);

/// A kind of error that knows how to describe itself.
pub trait ErrorKind: Debug + Send + Sync {
    /// Describes the error, labelling the given regions of the source named `src_id`.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)>;
}

/// An error located in some input.
#[derive(Debug)]
pub struct Error {
    pub spans: Vec<Range<usize>>,
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self { spans, kind: Box::new(kind) }
    }

    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }

    /// Renders the report for `input` into `writer`.
    pub fn write_report<W: io::Write>(&self, src_id: &str, input: &str, writer: W) -> io::Result<()> {
        self.build_report(src_id).write((src_id, Source::from(input)), writer)
    }

    /// Renders the report for `input` to stderr.
    pub fn report_to_stderr(&self, src_id: &str, input: &str) -> io::Result<()> {
        self.build_report(src_id).eprint((src_id, Source::from(input)))
    }
}

#[cfg(test)]
mod tests {
    use ariadne::{Label, ReportKind};
    use super::*;

    #[derive(Debug)]
    struct UnusedDie {
        value: u8,
    }

    impl ErrorKind for UnusedDie {
        fn build_report<'a>(
            &self,
            src_id: &'a str,
            spans: &[Range<usize>],
        ) -> Report<(&'a str, Range<usize>)> {
            Report::build(ReportKind::Error, src_id, spans[0].start)
                .with_message(format!("the die `{}` was never used", self.value))
                .with_label(Label::new((src_id, spans[0].clone())).with_message("this expression"))
                .finish()
        }
    }

    #[test]
    fn report_mentions_message_and_label() {
        let input = "1 + 2 + 3 + 4";
        let err = Error::new(vec![0..input.len()], UnusedDie { value: 5 });

        let mut out = Vec::new();
        err.write_report("input", input, &mut out).unwrap();
        let text = String::from_utf8(strip_ansi_escapes::strip(out)).unwrap();

        assert!(text.contains("the die `5` was never used"));
        assert!(text.contains("this expression"));
        assert!(text.contains("1 + 2 + 3 + 4"));
    }
}
