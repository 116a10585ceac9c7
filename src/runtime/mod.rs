//==============================================
// File: runtime/mod.rs
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Host collaborators for the Kwenda interpreter
// Objective: Abstract console and filesystem access behind traits so programs
//            can run against the real process or fully in memory
//==============================================

//==============================================
// Import & Modules
//==============================================

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

//==============================================
// Section 1.0 - Console
//==============================================

pub trait Console {
    /// Print one line of program output.
    fn write_line(&mut self, line: &str);
    /// Show a prompt without a trailing newline.
    fn prompt(&mut self, text: &str);
    /// Next input line without its line ending; `None` at end of input.
    fn read_line(&mut self) -> Option<String>;
}

/// Console bound to the process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&mut self, line: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }

    fn prompt(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "{text}");
        let _ = out.flush();
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        }
    }
}

/// In-memory console: scripted input, captured output.
///
/// Clones share the same output buffer, so a test can keep one handle and
/// give another to the interpreter.
#[derive(Debug, Clone, Default)]
pub struct BufferedConsole {
    output: Rc<RefCell<String>>,
    input: Rc<RefCell<VecDeque<String>>>,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = Self::default();
        console
            .input
            .borrow_mut()
            .extend(lines.into_iter().map(Into::into));
        console
    }

    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.output.borrow().lines().map(str::to_string).collect()
    }
}

impl Console for BufferedConsole {
    fn write_line(&mut self, line: &str) {
        let mut output = self.output.borrow_mut();
        output.push_str(line);
        output.push('\n');
    }

    fn prompt(&mut self, text: &str) {
        self.output.borrow_mut().push_str(text);
    }

    fn read_line(&mut self) -> Option<String> {
        self.input.borrow_mut().pop_front()
    }
}

//==============================================
// Section 2.0 - Filesystem
//==============================================

pub trait FileSystem {
    fn read(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str, append: bool) -> io::Result<()>;
    fn create(&self, path: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Filesystem backed by `std::fs`.
#[derive(Debug, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str, append: bool) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;
        file.write_all(contents.as_bytes())
    }

    fn create(&self, path: &Path) -> io::Result<()> {
        fs::File::create(path).map(|_| ())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_console_shares_output_between_clones() {
        let console = BufferedConsole::with_input(["42"]);
        let mut handle = console.clone();
        handle.prompt("> ");
        handle.write_line("habari");
        assert_eq!(console.output(), "> habari\n");
        assert_eq!(handle.read_line().as_deref(), Some("42"));
        assert_eq!(handle.read_line(), None);
    }

    #[test]
    fn std_filesystem_writes_and_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.txt");
        let fs = StdFileSystem;
        fs.write(&path, "a", false).expect("write");
        fs.write(&path, "b", true).expect("append");
        assert_eq!(fs.read(&path).expect("read"), "ab");
        fs.write(&path, "c", false).expect("truncate");
        assert_eq!(fs.read(&path).expect("read"), "c");
        fs.remove(&path).expect("remove");
        assert!(!fs.exists(&path));
    }
}

//==============================================
// End of file
//==============================================
