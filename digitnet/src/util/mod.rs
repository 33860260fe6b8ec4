use crate::error::{Error, Result};
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;

pub mod bench;

/// Writes `tokens` separated by single spaces and ends the line.
pub(crate) fn write_tokens<W, I, D>(writer: &mut W, tokens: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = D>,
    D: Display,
{
    let mut first = true;
    for token in tokens {
        if first {
            first = false;
        } else {
            writer.write_all(b" ")?;
        }
        write!(writer, "{token}")?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}

pub(crate) fn parse_tokens<'a, V, I>(tokens: I, line_no: usize) -> Result<Vec<V>>
where
    V: FromStr,
    I: Iterator<Item = &'a str>,
{
    tokens
        .map(|token| {
            token
                .parse()
                .map_err(|_| Error::parse(line_no, format!("malformed number {token:?}")))
        })
        .collect()
}
