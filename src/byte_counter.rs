//! # Byte Counter Module
//!
//! Sink `Write` che scarta i byte ricevuti e ne conta soltanto la lunghezza.
//! Serve a misurare la dimensione di un encoding JPEG senza allocare l'output.

use std::io::{self, Write};

/// Writer that discards everything and remembers how many bytes went through it
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteCounter {
    count: u64,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bytes written so far
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.count += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
