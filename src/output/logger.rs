/*
 *  Crafter, a referee for user-defined chess variants.
 *  Copyright (C) 2024 ToTheAnd
 *
 *  Crafter is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  Crafter is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with Crafter. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::general::common::Res;
use crate::output::Message;
use anyhow::{anyhow, bail};
use colored::Colorize;
use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io::{stderr, stdout, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Where log lines go.
pub enum LogStream {
    // Don't use a BufWriter so the log is always up to date.
    File(File, String),
    Stdout,
    Stderr,
    /// Keeps every line in memory.
    Captured(Vec<String>),
    Disabled,
}

impl LogStream {
    /// `stdout`, `stderr`, `none`, or a file name. File names must contain a `.` to catch typos.
    pub fn from_name(name: &str) -> Res<Self> {
        let stream = match name.trim() {
            "" | "stderr" => LogStream::Stderr,
            "stdout" => LogStream::Stdout,
            "none" => LogStream::Disabled,
            file => Self::from_filename(file)?,
        };
        Ok(stream)
    }

    pub fn from_filename(name: &str) -> Res<Self> {
        if !name.contains('.') {
            bail!(
                "'{}' does not appear to be a valid log filename (it does not contain a '.'). \
                Expected either a filename, 'stdout', 'stderr', or 'none'.",
                name.red()
            );
        }
        let path = Path::new(name);
        let file = File::create(path).map_err(|err| anyhow!("Couldn't create log file '{name}': {err}"))?;
        let name = path.canonicalize().ok().as_ref().and_then(|p| p.to_str()).unwrap_or(name).to_string();
        Ok(LogStream::File(file, name))
    }

    pub fn name(&self) -> String {
        match self {
            LogStream::File(_, name) => name.clone(),
            LogStream::Stdout => "stdout".to_string(),
            LogStream::Stderr => "stderr".to_string(),
            LogStream::Captured(_) => "captured".to_string(),
            LogStream::Disabled => "none".to_string(),
        }
    }

    fn write(&mut self, timestamp: &str, typ: Message, msg: &str) {
        // a failed log write is not worth aborting anything for
        _ = match self {
            LogStream::File(f, _) => writeln!(f, "[{timestamp}] {} {msg}", typ.message_prefix()),
            LogStream::Stdout => writeln!(stdout(), "[{timestamp}] {} {msg}", typ.colored_prefix()),
            LogStream::Stderr => writeln!(stderr(), "[{timestamp}] {} {msg}", typ.colored_prefix()),
            LogStream::Captured(lines) => {
                lines.push(format!("[{timestamp}] {} {msg}", typ.message_prefix()));
                Ok(())
            }
            LogStream::Disabled => Ok(()),
        };
    }
}

impl Debug for LogStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LogStream({})", self.name())
    }
}

/// A cheap-to-clone handle to a shared log stream. Every clone writes to the same stream.
#[derive(Debug, Clone)]
pub struct Logger {
    stream: Arc<Mutex<LogStream>>,
    threshold: Message,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogStream::Stderr, Message::Info)
    }
}

impl Logger {
    pub fn new(stream: LogStream, threshold: Message) -> Self {
        Self { stream: Arc::new(Mutex::new(stream)), threshold }
    }

    pub fn disabled() -> Self {
        Self::new(LogStream::Disabled, Message::Error)
    }

    pub fn captured(threshold: Message) -> Self {
        Self::new(LogStream::Captured(vec![]), threshold)
    }

    pub fn threshold(&self) -> Message {
        self.threshold
    }

    pub fn with_threshold(mut self, threshold: Message) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn stream_name(&self) -> String {
        self.lock().name()
    }

    pub fn log(&self, typ: Message, msg: &str) {
        if typ > self.threshold {
            return;
        }
        let timestamp = chrono::offset::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, false);
        self.lock().write(&timestamp, typ, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Message::Info, msg);
    }

    pub fn warning(&self, msg: &str) {
        self.log(Message::Warning, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Message::Error, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(Message::Debug, msg);
    }

    /// The lines written so far if this logger captures its output, otherwise an empty list.
    pub fn captured_lines(&self) -> Vec<String> {
        match &*self.lock() {
            LogStream::Captured(lines) => lines.clone(),
            _ => vec![],
        }
    }

    fn lock(&self) -> MutexGuard<'_, LogStream> {
        // writing a line can't leave the stream half-updated, so a poisoned lock is still usable
        self.stream.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_test() {
        let logger = Logger::captured(Message::Info);
        let clone = logger.clone();
        logger.info("started");
        clone.debug("hidden");
        clone.error("broken");
        let lines = logger.captured_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] INFO started"));
        assert!(lines[1].ends_with("] ERROR broken"));

        let verbose = Logger::captured(Message::Info).with_threshold(Message::Debug);
        verbose.debug("shown");
        assert_eq!(verbose.captured_lines().len(), 1);
    }

    #[test]
    fn stream_names_test() {
        assert_eq!(LogStream::from_name("").unwrap().name(), "stderr");
        assert_eq!(LogStream::from_name("stdout").unwrap().name(), "stdout");
        assert_eq!(LogStream::from_name("none").unwrap().name(), "none");
        assert!(LogStream::from_name("logfile").is_err());
        assert!(Logger::disabled().captured_lines().is_empty());
        assert_eq!(Logger::captured(Message::Debug).stream_name(), "captured");
    }
}
