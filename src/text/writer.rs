use crate::{Error, ErrorKind, Ini, Section};
use std::io::Write;

/// Write data in INI format.
///
/// Every entry is written on its own line. Lines are separated with `\n` and the output
/// does not end with a line terminator.
///
/// ```
/// use inibind::IniWriter;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut out: Vec<u8> = Vec::new();
/// let mut writer = IniWriter::new(&mut out);
/// writer.write_property("app", "", "demo")?;
/// writer.write_section("Database")?;
/// writer.write_property("Port", "", "143")?;
/// writer.write_property("size", "small", "1")?;
/// assert_eq!(
///     std::str::from_utf8(&out).unwrap(),
///     "app=demo\n[Database]\nPort=143\nsize[small]=1"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct IniWriter<W> {
    writer: W,
    wrote_line: bool,
}

impl<W> IniWriter<W>
where
    W: Write,
{
    /// Create a writer that outputs to the given sink
    pub fn new(writer: W) -> Self {
        IniWriter {
            writer,
            wrote_line: false,
        }
    }

    /// Get inner writer, keeping ownership
    pub fn inner(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes this Writer, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn start_line(&mut self) -> Result<(), Error> {
        if self.wrote_line {
            self.writer.write_all(b"\n")?;
        }
        self.wrote_line = true;
        Ok(())
    }

    /// Write a `[name]` header. Subsequent properties belong to this section.
    pub fn write_section(&mut self, name: &str) -> Result<(), Error> {
        if name.is_empty() || !is_trimmed(name) || name.contains([']', '\n', '\r']) {
            return Err(invalid("section name", name));
        }

        self.start_line()?;
        self.writer.write_all(b"[")?;
        self.writer.write_all(name.as_bytes())?;
        self.writer.write_all(b"]")?;
        Ok(())
    }

    /// Write `key=value`, or `key[map_key]=value` when the map key is not empty.
    ///
    /// Line breaks inside the value are escaped with a trailing `\` so they can be read
    /// back with multiline values enabled.
    pub fn write_property(&mut self, key: &str, map_key: &str, value: &str) -> Result<(), Error> {
        if !is_valid_key(key) {
            return Err(invalid("key", key));
        }

        if !is_trimmed(map_key) || map_key.contains([']', '\n', '\r']) {
            return Err(invalid("map key", map_key));
        }

        self.start_line()?;
        self.writer.write_all(key.as_bytes())?;
        if !map_key.is_empty() {
            self.writer.write_all(b"[")?;
            self.writer.write_all(map_key.as_bytes())?;
            self.writer.write_all(b"]")?;
        }
        self.writer.write_all(b"=")?;

        let mut lines = value.split('\n');
        if let Some(first) = lines.next() {
            self.writer.write_all(first.as_bytes())?;
        }
        for line in lines {
            self.writer.write_all(b"\\\n")?;
            self.writer.write_all(line.as_bytes())?;
        }

        Ok(())
    }

    /// Write every property of a section (but not its header)
    pub fn write_properties(&mut self, section: &Section) -> Result<(), Error> {
        for (key, property) in section.properties() {
            for (map_key, values) in property.entries() {
                for value in values {
                    self.write_property(key, map_key, value)?;
                }
            }
        }
        Ok(())
    }

    /// Write out an entire parse tree: global properties first, then each section.
    pub fn write_tree(&mut self, tree: &Ini) -> Result<(), Error> {
        self.write_properties(tree.global())?;
        for section in tree.sections() {
            self.write_section(section.name())?;
            self.write_properties(section)?;
        }
        Ok(())
    }
}

// Names are trimmed when parsed
fn is_trimmed(name: &str) -> bool {
    name.trim() == name
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && is_trimmed(key)
        && !key.starts_with([';', '#', '['])
        && !key.contains(['=', '[', ']', '\n', '\r'])
}

fn invalid(what: &'static str, name: &str) -> Error {
    Error::new(ErrorKind::InvalidName {
        what,
        name: name.to_owned(),
    })
}
