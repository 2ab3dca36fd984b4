pub mod cell_parser;
pub mod row_parser;
pub mod workbook_reader;

pub use cell_parser::{CellKind, CellParser};
pub use row_parser::RowParser;
pub use workbook_reader::{WorkbookReader, Worksheet};
