//! Edge-list reader

use super::{IoError, IoResult};
use crate::graph::VertexId;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Column separator of an edge list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// Any run of spaces or tabs
    #[default]
    Whitespace,
    Char(char),
}

impl Delimiter {
    /// Parse a command-line delimiter: `ws`/`whitespace`, `tab`, `\t`, or a single character
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ws" | "whitespace" => Some(Delimiter::Whitespace),
            "tab" | "\\t" | "\t" => Some(Delimiter::Char('\t')),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Delimiter::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeReaderOptions {
    pub delimiter: Delimiter,
    /// Ignore the first record line (comments and blank lines don't count)
    pub skip_header: bool,
}

/// Iterator over the edges of a line-oriented edge list.
///
/// Blank lines and lines starting with `#` or `%` are skipped. Columns
/// after the second are ignored. A line whose first two columns are not
/// vertex ids yields `IoError::Malformed`; iteration may continue past it.
pub struct EdgeReader<R> {
    lines: Lines<R>,
    options: EdgeReaderOptions,
    line_no: usize,
    header_pending: bool,
}

impl EdgeReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, options: EdgeReaderOptions) -> IoResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), options))
    }
}

impl<R: BufRead> EdgeReader<R> {
    pub fn new(reader: R, options: EdgeReaderOptions) -> Self {
        Self {
            lines: reader.lines(),
            options,
            line_no: 0,
            header_pending: options.skip_header,
        }
    }

    /// Number of the last line read, 1-based
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    fn parse(&self, line: &str) -> Option<(VertexId, VertexId)> {
        match self.options.delimiter {
            Delimiter::Whitespace => parse_pair(line.split_whitespace()),
            Delimiter::Char(c) => parse_pair(line.split(c).map(str::trim)),
        }
    }
}

fn parse_pair<'a>(mut fields: impl Iterator<Item = &'a str>) -> Option<(VertexId, VertexId)> {
    let u = fields.next()?.parse().ok()?;
    let v = fields.next()?.parse().ok()?;
    Some((u, v))
}

pub(crate) fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with('%')
}

impl<R: BufRead> Iterator for EdgeReader<R> {
    type Item = IoResult<(VertexId, VertexId)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if is_skippable(trimmed) {
                continue;
            }
            if self.header_pending {
                self.header_pending = false;
                continue;
            }

            return Some(self.parse(trimmed).ok_or_else(|| IoError::Malformed {
                line: self.line_no,
                content: trimmed.to_string(),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(input: &str, options: EdgeReaderOptions) -> Vec<IoResult<(VertexId, VertexId)>> {
        EdgeReader::new(Cursor::new(input.to_string()), options).collect()
    }

    #[test]
    fn test_whitespace_and_comments() {
        let input = "# comment\n% also a comment\n\n1 2\n2\t3  99\n  3 1\n";
        let edges: Vec<_> = read(input, EdgeReaderOptions::default())
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(edges, vec![(1, 2), (2, 3), (3, 1)]);
    }

    #[test]
    fn test_char_delimiter_and_header() {
        let options = EdgeReaderOptions {
            delimiter: Delimiter::Char(','),
            skip_header: true,
        };
        let edges: Vec<_> = read("src,dst\n4, 5\n6,7,x\n", options)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(edges, vec![(4, 5), (6, 7)]);
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let results = read("1 2\nfoo bar\n3 4\n", EdgeReaderOptions::default());
        assert_eq!(results.len(), 3);
        match &results[1] {
            Err(IoError::Malformed { line, content }) => {
                assert_eq!(*line, 2);
                assert_eq!(content, "foo bar");
            }
            other => panic!("expected malformed record, got {:?}", other),
        }
        assert_eq!(results[2].as_ref().unwrap(), &(3, 4));
    }

    #[test]
    fn test_single_column_is_malformed() {
        let results = read("7\n", EdgeReaderOptions::default());
        assert!(matches!(results[0], Err(IoError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_delimiter_parse() {
        assert_eq!(Delimiter::parse("ws"), Some(Delimiter::Whitespace));
        assert_eq!(Delimiter::parse("tab"), Some(Delimiter::Char('\t')));
        assert_eq!(Delimiter::parse(","), Some(Delimiter::Char(',')));
        assert_eq!(Delimiter::parse(",;"), None);
    }
}
