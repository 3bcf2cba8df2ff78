use std::{fs::File, io::{self, Write, BufWriter}, path::Path};
use anyhow::Result;
use regex::Regex;
use lazy_static::lazy_static;
use log::debug;

use located_error::LocatedError;

pub mod error;
pub use error::WriterError;

/// Field separator of every table written by `GenericWriter::write_iter()`
pub const WRITER_SEPARATOR: &str = "\t";

/// A buffered writer targeting either a file, or stdout.
/// - source: Boxed `BufWriter`
pub struct GenericWriter<'a> {
    source: BufWriter<Box<dyn Write + 'a>>
}

impl<'a> GenericWriter<'a>{
    /// Instantiate a new `GenericWriter`, linked to a file, or to stdout when `path` is `None`.
    /// 
    /// # Errors
    /// if `path` is either an invalid file, or the user does not have the proper
    /// UNIX permissions to write at this location.
    pub fn new(path: Option<impl AsRef<Path>>) -> Result<GenericWriter<'a>>{
        use WriterError::IOError;
        Ok(GenericWriter{ source: match path {
            Some(path) => {
                debug!("Creating output file {}", path.as_ref().display());
                let file = File::create(path).map_err(IOError).loc("While creating file")?;
                BufWriter::new(Box::new(file))
            },
            None => {
                BufWriter::new(Box::new(io::stdout()))
            }
        }})
    }

    /// Same as `GenericWriter::new()`, but refuse to truncate an already existing file,
    /// unless `overwrite` is set.
    /// 
    /// # Errors
    /// - `WriterError::Exists` if `path` exists and `overwrite` is false.
    pub fn create(path: impl AsRef<Path>, overwrite: bool) -> Result<GenericWriter<'a>> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(WriterError::Exists(path.display().to_string())).loc("While creating file")
        }
        Self::new(Some(path))
    }

    /// Write the contents of a generic iterator within a file/stdout.
    /// one Iteration step = one line.
    /// 
    /// # Behavior
    /// 
    /// For each item of the iterator, `write_iter` will search for the regular expression
    /// `[ ]+-[ ]+` and replace matches with `\t`. This effectively removes "Pretty-print" 
    /// from the output.
    /// 
    /// # Errors
    /// - If any of the Items within `iter` fails to get written within the file.
    /// 
    /// # Panics
    /// - if parsing the regex required to delete pretty-print characters fails.
    /// 
    pub fn write_iter<T, I>(&mut self, iter: T) -> Result<()>
    where   T: IntoIterator<Item = I>,
            I: std::fmt::Display,
    {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"[ ]+-[ ]+").expect("Failed to parse regex.");
        }
        for obj in iter {
            self.source.write_all(RE.replace_all(&format!("{obj}\n"), WRITER_SEPARATOR).as_bytes())
                .map_err(WriterError::IOError)
                .loc("While writing contents into file")?;
        }
        self.source.flush().loc("While flushing buffer contents of Writer")
    }

    /// Write `contents` as is, without removing any pretty-print.
    /// 
    /// # Errors
    /// - If `contents` fails to get written, or the buffer fails to get flushed.
    pub fn write_str(&mut self, contents: &str) -> Result<()> {
        self.source.write_all(contents.as_bytes())
            .map_err(WriterError::IOError)
            .loc("While writing contents into file")?;
        self.source.flush().loc("While flushing buffer contents of Writer")
    }
}

impl Write for GenericWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.source.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.source.flush()
    }
}
