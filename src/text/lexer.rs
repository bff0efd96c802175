use crate::{Error, Options, ParseErrorKind};
use std::borrow::Cow;
use std::iter::{Enumerate, Peekable};
use std::str::Lines;

/// A single logical line of INI text
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token<'a> {
    /// A `[name]` header with the surrounding whitespace removed
    Section(&'a str),

    /// A `key=value` or `key[map_key]=value` line. The map key is empty for plain
    /// properties. The value is owned only when continuation lines were joined.
    Property {
        key: &'a str,
        map_key: &'a str,
        value: Cow<'a, str>,
    },

    /// A comment line without its marker
    Comment(&'a str),
}

/// Splits INI text into tokens, one logical line at a time.
///
/// ```
/// use inibind::{Lexer, Options, Token};
///
/// let mut lexer = Lexer::new("; hello\n[Database]\nPort=143", Options::default());
/// assert_eq!(lexer.next().unwrap()?, Token::Comment("hello"));
/// assert_eq!(lexer.next().unwrap()?, Token::Section("Database"));
/// assert!(matches!(
///     lexer.next().unwrap()?,
///     Token::Property { key: "Port", map_key: "", .. }
/// ));
/// assert!(lexer.next().is_none());
/// # Ok::<(), inibind::Error>(())
/// ```
#[derive(Debug)]
pub struct Lexer<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    options: Options,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over the given text
    pub fn new(data: &'a str, options: Options) -> Self {
        Lexer {
            lines: data.lines().enumerate().peekable(),
            options,
            line: 0,
        }
    }

    /// The 1-based line of the most recently returned token
    pub fn line(&self) -> usize {
        self.line
    }

    fn is_comment(&self, line: &str) -> bool {
        line.starts_with(';') || (self.options.allow_number_sign_comments && line.starts_with('#'))
    }

    fn section(&self, line: &'a str) -> Result<Token<'a>, Error> {
        let name = line[1..]
            .strip_suffix(']')
            .ok_or_else(|| Error::parse(self.line, ParseErrorKind::UnterminatedSection))?
            .trim();

        if name.is_empty() {
            return Err(Error::parse(self.line, ParseErrorKind::EmptySectionName));
        }

        Ok(Token::Section(name))
    }

    fn property(&mut self, line: &'a str) -> Result<Token<'a>, Error> {
        let (lhs, rhs) = line.split_once('=').ok_or_else(|| {
            Error::parse(
                self.line,
                ParseErrorKind::MissingSeparator(line.to_owned()),
            )
        })?;

        let lhs = lhs.trim();
        let (key, map_key) = match lhs.strip_suffix(']') {
            Some(head) => match head.split_once('[') {
                Some((key, map_key)) => (key.trim(), map_key.trim()),
                None => (lhs, ""),
            },
            None if lhs.contains('[') => {
                return Err(Error::parse(
                    self.line,
                    ParseErrorKind::UnterminatedMapKey(lhs.to_owned()),
                ))
            }
            None => (lhs, ""),
        };

        if key.is_empty() {
            return Err(Error::parse(self.line, ParseErrorKind::EmptyKey));
        }

        let mut value = Cow::Borrowed(rhs.trim());
        if self.options.allow_multiline_values {
            value = self.continuation(value);
        }

        Ok(Token::Property {
            key,
            map_key,
            value,
        })
    }

    /// Joins lines onto a value with `\n`. A trailing `\` escapes the line break, and a
    /// non-blank line that starts with whitespace continues the previous value.
    fn continuation(&mut self, mut value: Cow<'a, str>) -> Cow<'a, str> {
        loop {
            if let Some(head) = value.strip_suffix('\\') {
                let mut head = head.to_owned();
                if let Some((idx, next)) = self.lines.next() {
                    self.line = idx + 1;
                    head.push('\n');
                    head.push_str(next.trim());
                }
                value = Cow::Owned(head);
                continue;
            }

            let indented = matches!(
                self.lines.peek(),
                Some((_, next)) if next.starts_with([' ', '\t']) && !next.trim().is_empty()
            );

            if !indented {
                return value;
            }

            if let Some((idx, next)) = self.lines.next() {
                self.line = idx + 1;
                let mut joined = value.into_owned();
                joined.push('\n');
                joined.push_str(next.trim());
                value = Cow::Owned(joined);
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, raw)) = self.lines.next() {
            self.line = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if self.is_comment(line) {
                return Some(Ok(Token::Comment(line[1..].trim())));
            }

            return Some(if line.starts_with('[') {
                self.section(line)
            } else {
                self.property(line)
            });
        }

        None
    }
}
