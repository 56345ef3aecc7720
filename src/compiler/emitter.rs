use std::io::{self, Write};

use super::operation::Operation;

/// Sink for a generated instruction sequence.
pub trait Emitter {
    fn emit(&mut self, operations: &[Operation], source_file: &str) -> io::Result<()>;
}

/// Writes one instruction per line, preceded by a header naming the source.
pub struct TextEmitter<W: Write> {
    writer: W,
}

impl<W: Write> TextEmitter<W> {
    pub fn new(writer: W) -> Self {
        TextEmitter { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Emitter for TextEmitter<W> {
    fn emit(&mut self, operations: &[Operation], source_file: &str) -> io::Result<()> {
        writeln!(self.writer, "# {}", source_file)?;
        for operation in operations.iter() {
            writeln!(self.writer, "{}", operation)?;
        }
        self.writer.flush()
    }
}
