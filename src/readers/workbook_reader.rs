use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::debug;

use crate::config::SheetSelection;
use crate::error::{ProcessingError, Result};
use crate::models::CellValue;
use crate::utils::constants::ROW_WIDTH;

/// One sheet's stored cells, detached from the workbook file.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    range: Range<Data>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, range: Range<Data>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the last row holding stored cells
    pub fn last_row(&self) -> Option<u32> {
        self.range.end().map(|(row, _)| row)
    }

    /// Cells of an observation row, or `None` when the row has no stored
    /// content at all. A stored row whose observation columns happen to be
    /// blank still yields twelve `Empty` cells.
    pub fn row(&self, index: u32) -> Option<Vec<CellValue>> {
        let (start, end) = (self.range.start()?, self.range.end()?);
        if index < start.0 || index > end.0 {
            return None;
        }

        let has_content = (start.1..=end.1).any(|col| {
            !matches!(self.range.get_value((index, col)), None | Some(Data::Empty))
        });
        if !has_content {
            return None;
        }

        Some(
            (0..ROW_WIDTH)
                .map(|col| CellValue::from(self.range.get_value((index, col))))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct WorkbookReader {
    sheets: SheetSelection,
}

impl WorkbookReader {
    pub fn new(sheets: SheetSelection) -> Self {
        Self { sheets }
    }

    /// Read the selected sheets of a workbook into memory.
    ///
    /// The file handle lives only for the duration of this call; it is
    /// released when the workbook goes out of scope, including on error.
    pub fn read(&self, path: &Path) -> Result<Vec<Worksheet>> {
        let mut workbook = open_workbook_auto(path)?;
        let names = workbook.sheet_names().to_owned();

        if names.is_empty() {
            return Err(ProcessingError::EmptyWorkbook);
        }

        let selected: Vec<String> = match self.sheets {
            SheetSelection::All => names,
            SheetSelection::First => names.into_iter().take(1).collect(),
        };

        let mut sheets = Vec::with_capacity(selected.len());
        for name in selected {
            let range = workbook.worksheet_range(&name)?;
            debug!("Sheet '{}' spans {:?}..{:?}", name, range.start(), range.end());
            sheets.push(Worksheet::new(name, range));
        }

        Ok(sheets)
    }
}

impl Default for WorkbookReader {
    fn default() -> Self {
        Self::new(SheetSelection::default())
    }
}
