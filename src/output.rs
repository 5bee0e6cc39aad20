//! Output sinks.  The interpreter never touches stdout directly: `print`
//! statements and diagnostics go through an [`Output`] so embedders and tests
//! can capture them.

use std::cell::RefCell;
use std::rc::Rc;

/// Line‑oriented sink for program output and error reports.
pub trait Output {
    /// One line of regular program output (`print`).
    fn print_line(&self, line: &str);

    /// One line of diagnostic output.
    fn error_line(&self, line: &str);
}

/// Writes to the process' stdout / stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdio;

impl Output for Stdio {
    fn print_line(&self, line: &str) {
        println!("{}", line);
    }

    fn error_line(&self, line: &str) {
        eprintln!("{}", line);
    }
}

/// A captured line, tagged with the stream it was written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Out(String),
    Err(String),
}

/// In‑memory sink.  Clones share one buffer, so a test keeps a clone and
/// hands the other to the interpreter.
#[derive(Debug, Default, Clone)]
pub struct Capture {
    lines: Rc<RefCell<Vec<Line>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line in write order.
    pub fn lines(&self) -> Vec<Line> {
        self.lines.borrow().clone()
    }

    /// Only the `print` output.
    pub fn stdout(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|l| match l {
                Line::Out(s) => Some(s.clone()),
                Line::Err(_) => None,
            })
            .collect()
    }

    /// Only the diagnostics.
    pub fn stderr(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|l| match l {
                Line::Err(s) => Some(s.clone()),
                Line::Out(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Output for Capture {
    fn print_line(&self, line: &str) {
        self.lines.borrow_mut().push(Line::Out(line.to_owned()));
    }

    fn error_line(&self, line: &str) {
        self.lines.borrow_mut().push(Line::Err(line.to_owned()));
    }
}
