/// Leading rows of every sheet holding titles and column headers
pub const DEFAULT_HEADER_ROWS: u32 = 4;

/// Fixed column layout of an observation row
pub const COL_DATE: u32 = 0;
pub const COL_TIME: u32 = 1;
pub const COL_TEMPERATURE: u32 = 2;
pub const COL_HUMIDITY: u32 = 3;
pub const COL_DEW_POINT: u32 = 4;
pub const COL_PRESSURE: u32 = 5;
pub const COL_WIND_DIRECTION: u32 = 6;
pub const COL_WIND_SPEED: u32 = 7;
pub const COL_CLOUDINESS: u32 = 8;
pub const COL_PRECIPITATION: u32 = 9;
pub const COL_VISIBILITY: u32 = 10;
pub const COL_PHENOMENA: u32 = 11;
pub const ROW_WIDTH: u32 = 12;

/// Temperature and dew point constraints (°C)
pub const MIN_VALID_TEMP: f64 = -50.0;
pub const MAX_VALID_TEMP: f64 = 50.0;

/// Text date patterns tried in order when a date cell is not a serial number
pub const DEFAULT_DATE_FORMATS: [&str; 2] = ["%m.%d.%Y", "%d.%m.%Y"];

/// Text time patterns tried in order when a time cell is not a day fraction
pub const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Moscow standard time
pub const DEFAULT_STATION_UTC_OFFSET: &str = "+03:00";

pub const DEFAULT_DATABASE_PATH: &str = "meteo-archive.db";
pub const DEFAULT_CONFIG_FILE: &str = "meteo-archive";
pub const DEFAULT_FILE_TIMEOUT_SECS: u64 = 120;

pub const MONTH_NAMES_RU: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

pub const MONTH_NAMES_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
