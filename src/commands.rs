use std::io::{BufRead, Write};

use anyhow::Result as Result;
use bstr::ByteSlice;
use log::debug;

use crate::sorted_list::{Deletion, Insertion, SortedList, MAX_ENTRY_LEN};

const COMMAND_PROMPT: &str = "Please enter a command (i, d, m, p, f, q):  ";
const STRING_PROMPT: &str = "Please enter a string:  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert,
    Print,
    Member,
    Delete,
    Free,
    Quit,
    Unknown(char),
}

impl From<char> for Command {
    fn from(character: char) -> Self {
        match character.to_ascii_lowercase() {
            'i' => Command::Insert,
            'p' => Command::Print,
            'm' => Command::Member,
            'd' => Command::Delete,
            'f' => Command::Free,
            'q' => Command::Quit,
            _ => Command::Unknown(character),
        }
    }
}

/// Whitespace-skipping reader over lines, handing out single characters or words.
///
/// Bytes that are not UTF-8 are replaced with U+FFFD rather than ending the session.
struct Scanner<R> {
    reader: R,
    buffer: Vec<u8>,
    line: String,
    cursor: usize,
}

impl<R: BufRead> Scanner<R> {
    fn new(reader: R) -> Self {
        Self { reader, buffer: Vec::new(), line: String::new(), cursor: 0 }
    }

    /// Returns false at end of input.
    fn skip_whitespace(&mut self) -> Result<bool> {
        loop {
            let rest = &self.line[self.cursor..];
            let trimmed = rest.trim_start();
            let exhausted = trimmed.is_empty();
            self.cursor += rest.len() - trimmed.len();
            if !exhausted {
                return Ok(true);
            }

            self.buffer.clear();
            self.cursor = 0;
            if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
                self.line.clear();
                return Ok(false);
            }
            self.line = self.buffer.to_str_lossy().into_owned();
        }
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        if !self.skip_whitespace()? {
            return Ok(None);
        }
        let character = self.line[self.cursor..].chars().next();
        if let Some(character) = character {
            self.cursor += character.len_utf8();
        }
        Ok(character)
    }

    fn next_word(&mut self) -> Result<Option<String>> {
        if !self.skip_whitespace()? {
            return Ok(None);
        }
        let rest = &self.line[self.cursor..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = rest[..end].to_owned();
        self.cursor += end;
        Ok(Some(word))
    }
}

/// Drives a sorted list from single-character commands until `q` or end of input.
pub fn run<R: BufRead, W: Write>(input: R, mut output: W) -> Result<SortedList> {
    let mut scanner = Scanner::new(input);
    let mut list = SortedList::new();

    loop {
        write!(output, "{COMMAND_PROMPT}")?;
        output.flush()?;
        let Some(character) = scanner.next_char()? else { break };

        let command = Command::from(character);
        debug!("command {command:?}");

        let argument = match command {
            Command::Insert | Command::Member | Command::Delete => {
                write!(output, "{STRING_PROMPT}")?;
                output.flush()?;
                match scanner.next_word()? {
                    Some(word) => word,
                    None => break,
                }
            },
            _ => String::new(),
        };

        match command {
            Command::Insert => match list.insert(&argument) {
                Insertion::Inserted => { },
                Insertion::AlreadyPresent => writeln!(output, "{argument} is already in the list")?,
                Insertion::Empty => writeln!(output, "Empty strings cannot be inserted")?,
                Insertion::TooLong => writeln!(output, "{argument} is longer than {MAX_ENTRY_LEN} characters")?,
            },
            Command::Print => writeln!(output, "{list}")?,
            Command::Member => {
                if list.member(&argument) {
                    writeln!(output, "{argument} is in the list")?;
                } else {
                    writeln!(output, "{argument} is not in the list")?;
                }
            },
            Command::Delete => {
                if list.delete(&argument) == Deletion::NotFound {
                    writeln!(output, "String was not found. No change was made.")?;
                }
            },
            Command::Free => list.clear(),
            Command::Quit => break,
            Command::Unknown(other) => {
                writeln!(output, "There is no {other} command")?;
                writeln!(output, "Please try again")?;
            }
        }
    }

    Ok(list)
}
