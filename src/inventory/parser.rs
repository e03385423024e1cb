//! Parser for nginx-style configuration files.
//!
//! The grammar is a sequence of statements (`command value...;`) and blocks
//! (`command [args] { ... }`), with `#` comments running to end of line.
//! Statements become inventory items under the path of the enclosing blocks.
//! A block with arguments contributes the segment `command:args`, where any
//! `/` inside the arguments is rewritten to `:` so it cannot be confused with
//! the path separator.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Inventory, VALUE_FIELD};

/// Errors produced while reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot open config file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading config file at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("error parsing config file at line {line}: unexpected closing bracket")]
    UnexpectedClosingBracket { line: usize },
}

/// Opens `path` and parses it into an inventory.
pub fn read_config_file(path: impl AsRef<Path>) -> Result<Inventory, ConfigError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ConfigError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(BufReader::new(file))
}

/// Parses configuration text into an inventory.
///
/// Reaching end of input while blocks are still open is accepted: whatever
/// was collected so far is returned.
pub fn parse_config<R: BufRead>(mut reader: R) -> Result<Inventory, ConfigError> {
    let mut state = ParseState::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        line_no += 1;
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| ConfigError::Io {
                line: line_no,
                source,
            })?;
        if read == 0 {
            break;
        }
        // Invalid UTF-8 becomes U+FFFD instead of failing the whole file.
        let line = String::from_utf8_lossy(&buf);
        state.feed_line(&line, line_no)?;
    }

    if !state.sections.is_empty() {
        debug!(
            open_sections = state.sections.len(),
            "config ended inside an open block"
        );
    }

    Ok(state.inventory)
}

#[derive(Default)]
struct ParseState {
    /// Segments of the currently open blocks.
    sections: Vec<String>,
    command: String,
    value: String,
    inventory: Inventory,
}

impl ParseState {
    fn feed_line(&mut self, line: &str, line_no: usize) -> Result<(), ConfigError> {
        let mut at_line_start = true;

        for c in line.chars() {
            match c {
                '#' => break,
                '\n' => break,
                ' ' | '\t' | '\r' => {
                    if !at_line_start {
                        self.whitespace(c);
                    }
                }
                '{' => {
                    at_line_start = false;
                    self.open_block();
                }
                '}' => {
                    at_line_start = false;
                    self.close_block(line_no)?;
                }
                ';' => {
                    at_line_start = false;
                    self.end_statement();
                }
                _ => {
                    at_line_start = false;
                    self.value.push(c);
                }
            }
        }

        self.line_break();
        Ok(())
    }

    /// A run of line breaks separates tokens like a single space.
    fn line_break(&mut self) {
        if self.value.is_empty() {
            return;
        }
        if self.command.is_empty() {
            self.command = std::mem::take(&mut self.value);
        } else if !self.value.ends_with([' ', '\t']) {
            self.value.push(' ');
        }
    }

    fn whitespace(&mut self, c: char) {
        if self.value.is_empty() {
            return;
        }
        if self.command.is_empty() {
            self.command = std::mem::take(&mut self.value);
        } else if c == '\r' {
            self.value.push(' ');
        } else {
            self.value.push(c);
        }
    }

    /// Moves a lone pending token into the command slot.
    fn promote_command(&mut self) {
        if self.command.is_empty() && !self.value.is_empty() {
            self.command = std::mem::take(&mut self.value);
        }
    }

    fn open_block(&mut self) {
        self.promote_command();
        let args = self.value.trim();
        let segment = if args.is_empty() {
            std::mem::take(&mut self.command)
        } else {
            format!("{}:{}", self.command, args.replace('/', ":"))
        };
        self.sections.push(segment);
        self.clear_pending();
    }

    fn close_block(&mut self, line_no: usize) -> Result<(), ConfigError> {
        if self.sections.pop().is_none() {
            return Err(ConfigError::UnexpectedClosingBracket { line: line_no });
        }
        if !self.command.is_empty() || !self.value.is_empty() {
            debug!(
                line = line_no,
                command = %self.command,
                "dropping unterminated statement before '}}'"
            );
        }
        self.clear_pending();
        Ok(())
    }

    fn end_statement(&mut self) {
        self.promote_command();
        if self.command.is_empty() {
            return;
        }
        let mut path = self.sections.clone();
        path.push(std::mem::take(&mut self.command));
        self.inventory
            .set_item(path, VALUE_FIELD, self.value.trim().to_string());
        self.clear_pending();
    }

    fn clear_pending(&mut self) {
        self.command.clear();
        self.value.clear();
    }
}
