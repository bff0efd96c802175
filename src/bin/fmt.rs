//! Utility to normalize INI files from stdin to stdout.
//!
//! Comments and blank lines are dropped, whitespace around keys and values is trimmed, and
//! values spanning multiple lines are rewritten with `\` continuations. Useful when
//! comparing a hand edited file with one produced by the encoder.

use std::{
    error,
    io::{self, BufWriter, Read},
};

fn main() -> Result<(), Box<dyn error::Error>> {
    let mut data = Vec::new();
    io::stdin().lock().read_to_end(&mut data)?;

    let tree = inibind::Ini::parser()
        .multiline_values(true)
        .number_sign_comments(true)
        .parse_slice(&data)?;

    let stdout = io::stdout().lock();
    let mut writer = inibind::IniWriter::new(BufWriter::new(stdout));
    writer.write_tree(&tree)?;
    Ok(())
}
