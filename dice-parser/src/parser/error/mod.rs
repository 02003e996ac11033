pub mod kind;

use ariadne::Report;
use dice_error::ErrorKind;
use std::ops::Range;

/// An error raised while parsing.
///
/// Most errors only mean that one alternative did not match, and the parser goes on to the next
/// one. A fatal error, such as an unclosed parenthesis, ends parsing at once: no alternative can
/// get past it.
#[derive(Debug)]
pub struct Error {
    pub spans: Vec<Range<usize>>,
    pub kind: Box<dyn ErrorKind>,
    pub fatal: bool,
}

impl Error {
    fn with_fatality(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static, fatal: bool) -> Self {
        Self { spans, kind: Box::new(kind), fatal }
    }

    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self::with_fatality(spans, kind, false)
    }

    pub fn new_fatal(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self::with_fatality(spans, kind, true)
    }

    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }
}

/// Drops whether the error was fatal, which only matters inside the parser.
impl From<Error> for dice_error::Error {
    fn from(err: Error) -> Self {
        Self { spans: err.spans, kind: err.kind }
    }
}
