pub mod constants;
pub mod excel_serial;
pub mod progress;

pub use constants::*;
pub use excel_serial::{serial_to_date, serial_to_time};
pub use progress::ProgressReporter;
