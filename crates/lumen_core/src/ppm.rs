//! Plain-text PPM (`P3`) raster output.
//!
//! The header is written up front and rows are appended as they finish, so
//! a long render can stream to disk without holding the whole image.

use std::io::{self, Write};

/// Streaming writer for `P3` images.
pub struct PpmWriter<W: Write> {
    out: W,
    width: u32,
    height: u32,
    rows_written: u32,
}

impl<W: Write> PpmWriter<W> {
    /// Write the header and return a writer ready for `height` rows.
    pub fn new(mut out: W, width: u32, height: u32) -> io::Result<Self> {
        write!(out, "P3\n{} {}\n255\n", width, height)?;
        Ok(Self {
            out,
            width,
            height,
            rows_written: 0,
        })
    }

    /// Append one scanline of quantized RGB triples.
    pub fn write_row(&mut self, row: &[[u8; 3]]) -> io::Result<()> {
        if row.len() != self.width as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("row has {} pixels, image width is {}", row.len(), self.width),
            ));
        }
        if self.rows_written >= self.height {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("image already has all {} rows", self.height),
            ));
        }

        for [r, g, b] in row {
            writeln!(self.out, "{} {} {}", r, g, b)?;
        }
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_remaining(&self) -> u32 {
        self.height - self.rows_written
    }

    /// Flush and hand back the underlying writer. Fails if rows are missing.
    pub fn finish(mut self) -> io::Result<W> {
        if self.rows_written != self.height {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("wrote {} of {} rows", self.rows_written, self.height),
            ));
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Write a complete image held in memory, row-major, top row first.
pub fn write_ppm<W: Write>(out: W, width: u32, height: u32, pixels: &[[u8; 3]]) -> io::Result<W> {
    let mut writer = PpmWriter::new(out, width, height)?;
    if width > 0 {
        for row in pixels.chunks(width as usize) {
            writer.write_row(row)?;
        }
    }
    writer.finish()
}
