use super::lexer::{Lexer, Token};
use crate::{Error, Ini, ParseErrorKind};

/// Toggles that change how INI text is tokenized. None of them affect how the parse tree is
/// bound to records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Allow a value to continue on the next line, either by ending the line with `\` or
    /// by indenting the following line
    pub allow_multiline_values: bool,

    /// Accept `#` in addition to `;` as a comment marker
    pub allow_number_sign_comments: bool,
}

/// Creates a parse tree out of INI text
///
/// ```
/// use inibind::IniParser;
///
/// let tree = IniParser::new()
///     .number_sign_comments(true)
///     .parse_slice(b"# generated\n[Database]\nPort=143")?;
/// assert_eq!(tree.section("Database").and_then(|x| x.value("Port")), Some("143"));
/// # Ok::<(), inibind::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IniParser {
    options: Options,
}

const BOM: &[u8] = b"\xef\xbb\xbf";

impl IniParser {
    /// Create a parser with every option disabled
    pub fn new() -> Self {
        IniParser::default()
    }

    /// Create a parser with the given options
    pub fn with_options(options: Options) -> Self {
        IniParser { options }
    }

    /// Allow values to span multiple lines
    pub fn multiline_values(mut self, enabled: bool) -> Self {
        self.options.allow_multiline_values = enabled;
        self
    }

    /// Treat lines starting with `#` as comments
    pub fn number_sign_comments(mut self, enabled: bool) -> Self {
        self.options.allow_number_sign_comments = enabled;
        self
    }

    /// The options this parser was configured with
    pub fn options(&self) -> Options {
        self.options
    }

    /// Parse utf-8 encoded INI data. A leading byte order mark is ignored.
    pub fn parse_slice(self, data: &[u8]) -> Result<Ini, Error> {
        let data = data.strip_prefix(BOM).unwrap_or(data);
        let text = std::str::from_utf8(data).map_err(|e| {
            let line = data[..e.valid_up_to()]
                .iter()
                .filter(|&&x| x == b'\n')
                .count();
            Error::parse(line + 1, ParseErrorKind::InvalidUtf8)
        })?;
        self.parse_str(text)
    }

    /// Parse INI text
    pub fn parse_str(self, data: &str) -> Result<Ini, Error> {
        let mut tree = Ini::new();
        for token in Lexer::new(data, self.options) {
            match token? {
                Token::Section(name) => {
                    tree.add_section(name);
                }
                Token::Property {
                    key,
                    map_key,
                    value,
                } => match tree.last_section_mut() {
                    Some(section) => section.push_value(key, map_key, value),
                    None => tree.global_mut().push_value(key, map_key, value),
                },
                Token::Comment(_) => {}
            }
        }

        tracing::trace!(
            globals = tree.global().len(),
            sections = tree.sections().len(),
            "parsed ini text"
        );
        Ok(tree)
    }
}

impl Ini {
    /// Convenience method for parsing the given text with default options
    pub fn from_slice(data: &[u8]) -> Result<Ini, Error> {
        IniParser::new().parse_slice(data)
    }

    /// Returns a parser for INI text
    pub fn parser() -> IniParser {
        IniParser::new()
    }
}
