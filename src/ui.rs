// UI layer: everything that ends up on the terminal goes through here.
//
// The engine only ever writes whole lines to a `Sink`. `Layout` knows the
// terminal width and whether colour is wanted, and turns names, links and
// errors into aligned lines. `Printer` pairs the two for the formatters.

use crossterm::style::Stylize;
use std::io::IsTerminal;

/// Base of the short links handed out by the service.
pub const SHORT_LINK_BASE: &str = "http://lts.cr/";

// Columns reserved for the link and id to the right of a name.
const INFO_RESERVE: usize = 35;
const FILE_RESERVE: usize = 37;
const ERROR_PREFIX: &str = "Error:";

/// Where display lines go.
pub trait Sink {
    fn line(&mut self, text: &str);
    fn error_line(&mut self, text: &str);
}

/// stdout/stderr sink. In quiet mode only error lines are written.
#[derive(Debug, Default)]
pub struct Terminal {
    quiet: bool,
}

impl Terminal {
    pub fn new(quiet: bool) -> Self {
        Terminal { quiet }
    }
}

impl Sink for Terminal {
    fn line(&mut self, text: &str) {
        if !self.quiet {
            println!("{}", text);
        }
    }

    fn error_line(&mut self, text: &str) {
        eprintln!("{}", text);
    }
}

/// One captured line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Out(String),
    Err(String),
}

/// Sink that keeps every line in memory, in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub lines: Vec<Line>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn out(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Out(s) => Some(s.as_str()),
                Line::Err(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Err(s) => Some(s.as_str()),
                Line::Out(_) => None,
            })
            .collect()
    }
}

impl Sink for Recorder {
    fn line(&mut self, text: &str) {
        self.lines.push(Line::Out(text.to_string()));
    }

    fn error_line(&mut self, text: &str) {
        self.lines.push(Line::Err(text.to_string()));
    }
}

/// Terminal geometry and colour settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    /// Columns available, `None` when the width could not be read.
    pub width: Option<usize>,
    pub color: bool,
}

impl Layout {
    /// Read the width from the terminal; colour unless `NO_COLOR` is set or
    /// stdout is redirected.
    pub fn detect() -> Self {
        let width = crossterm::terminal::size()
            .ok()
            .map(|(cols, _)| cols as usize)
            .filter(|cols| *cols > 0);
        let color = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        Layout { width, color }
    }

    /// Plain layout: no width, no colour. Used by tests and pipes.
    pub fn plain() -> Self {
        Layout::default()
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    fn red(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn link(short_code: &str, id: &str) -> String {
        format!("URL: {}{}  ID: {}", SHORT_LINK_BASE, short_code, id)
    }

    // Name on the left, link and id pushed to the right edge.
    fn aligned(&self, prefix: &str, name: &str, short_code: &str, id: &str, reserve: usize) -> String {
        match self.width {
            Some(width) => {
                let room = width.saturating_sub(reserve);
                let name = if name.chars().count() > room {
                    truncate_name(name, room)
                } else {
                    name.to_string()
                };
                let used = prefix.chars().count() + name.chars().count();
                format!(
                    "{}{}{:>pad$}",
                    prefix,
                    name,
                    Self::link(short_code, id),
                    pad = width.saturating_sub(used)
                )
            }
            None => format!(
                "{}{}\t\tURL: {}{}\tID: {}",
                prefix, name, SHORT_LINK_BASE, short_code, id
            ),
        }
    }

    /// Line for a crate or a search hit.
    pub fn info_line(&self, name: &str, short_code: &str, id: &str) -> String {
        self.aligned("", name, short_code, id, INFO_RESERVE)
    }

    /// Indented line for a file inside a crate listing.
    pub fn file_line(&self, name: &str, short_code: &str, id: &str) -> String {
        self.aligned("* ", name, short_code, id, FILE_RESERVE)
    }

    /// `Error: message` with `<argument>` right-aligned.
    pub fn error_line(&self, message: &str, argument: Option<&str>) -> String {
        let prefix = self.red(ERROR_PREFIX);
        let Some(argument) = argument else {
            return format!("{} {}", prefix, message);
        };
        let tag = format!("<{}>", argument);
        match self.width {
            Some(width) => {
                let used = message.chars().count() + ERROR_PREFIX.len() + 1;
                format!(
                    "{} {}{:>pad$}",
                    prefix,
                    message,
                    tag,
                    pad = width.saturating_sub(used)
                )
            }
            None => format!("{} {}\t{}", prefix, message, tag),
        }
    }

    /// Header above a block of search results.
    pub fn header(&self, text: &str) -> String {
        self.green(&format!("{}:", text))
    }
}

/// Shorten `name` to about `length` characters by keeping its start and end
/// and replacing the middle with `...`.
pub fn truncate_name(name: &str, length: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    let keep = (length / 2).saturating_sub(1);
    if keep == 0 || chars.len() <= keep * 2 + 3 {
        return name.to_string();
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Formatter-facing writer. Counts the error lines it emits.
pub struct Printer<'a> {
    layout: &'a Layout,
    sink: &'a mut dyn Sink,
    errors: usize,
}

impl<'a> Printer<'a> {
    pub fn new(layout: &'a Layout, sink: &'a mut dyn Sink) -> Self {
        Printer {
            layout,
            sink,
            errors: 0,
        }
    }

    pub fn line(&mut self, text: &str) {
        self.sink.line(text);
    }

    pub fn info(&mut self, name: &str, short_code: &str, id: &str) {
        let text = self.layout.info_line(name, short_code, id);
        self.sink.line(&text);
    }

    pub fn file(&mut self, name: &str, short_code: &str, id: &str) {
        let text = self.layout.file_line(name, short_code, id);
        self.sink.line(&text);
    }

    pub fn header(&mut self, text: &str) {
        let text = self.layout.header(text);
        self.sink.line(&text);
    }

    pub fn error(&mut self, message: &str, argument: &str) {
        self.errors += 1;
        let text = self.layout.error_line(message, Some(argument));
        self.sink.error_line(&text);
    }

    pub fn errors(&self) -> usize {
        self.errors
    }
}
