//! CSV writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use sheetfill_core::{CellAddress, CellRange, Worksheet};

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a worksheet to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        worksheet: &Worksheet,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = BufWriter::new(File::create(path)?);
        Self::write(worksheet, file, options)
    }

    /// Write a worksheet to a writer
    ///
    /// Every row of the grid is written with the same number of fields.
    /// Formula cells contribute their cached value.
    pub fn write<W: Write>(
        worksheet: &Worksheet,
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        if let Some(range) = Self::grid(worksheet, options) {
            for row in range.start.row..=range.end.row {
                let record: Vec<String> = (range.start.col..=range.end.col)
                    .map(|col| worksheet.get_value_at(row, col).to_string())
                    .collect();
                csv_writer.write_record(&record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Rectangle of stored cells, `None` when there are none
    fn grid(worksheet: &Worksheet, options: &CsvWriteOptions) -> Option<CellRange> {
        let mut cells = worksheet.iter_cells().filter(|(_, c)| !c.value.is_empty());
        let (first, _) = cells.next()?;

        let (mut min, mut max) = (first, first);
        for (addr, _) in cells {
            min = CellAddress::new(min.row.min(addr.row), min.col.min(addr.col));
            max = CellAddress::new(max.row.max(addr.row), max.col.max(addr.col));
        }
        if options.from_origin {
            min = CellAddress::new(0, 0);
        }
        Some(CellRange::new(min, max))
    }
}
