use calamine::{Data, Range};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meteo_archive::models::CellValue;
use meteo_archive::processors::{ImportPipeline, RecordValidator};
use meteo_archive::readers::{CellParser, RowParser, Worksheet};

fn observation_cells(hour: usize) -> Vec<CellValue> {
    vec![
        CellValue::text("31.12.2024"),
        CellValue::Numeric(hour as f64 / 24.0),
        CellValue::Numeric(-3.4),
        CellValue::Numeric(86.0),
        CellValue::Numeric(-5.6),
        CellValue::Numeric(745.0),
        CellValue::text("Ветер, дующий с северо-запада"),
        CellValue::Numeric(3.0),
        CellValue::Numeric(100.0),
        CellValue::Numeric(0.3),
        CellValue::Numeric(10.0),
        CellValue::text("Снег"),
    ]
}

// A month of 3-hourly observations below four header rows
fn create_sheet(rows: u32) -> Worksheet {
    let mut range = Range::new((0, 0), (rows + 3, 11));
    range.set_value((0, 0), Data::String("Архив погоды".to_string()));

    for i in 0..rows {
        let index = i + 4;
        let date = format!("{:02}.{:02}.2024", 1 + i / 8 % 12, 1 + i / 96 % 28);
        range.set_value((index, 0), Data::String(date));
        range.set_value((index, 1), Data::Float((i % 8) as f64 * 0.125));
        range.set_value((index, 2), Data::Float(-3.4 + (i % 10) as f64));
        range.set_value((index, 3), Data::Float(86.0));
        range.set_value((index, 4), Data::Float(-5.6));
        range.set_value((index, 5), Data::Float(745.0));
        range.set_value((index, 6), Data::String("Штиль".to_string()));
        range.set_value((index, 7), Data::Float(0.0));
        range.set_value((index, 8), Data::Float(50.0));
        range.set_value((index, 9), Data::Float(0.1));
        range.set_value((index, 10), Data::Empty);
        range.set_value((index, 11), Data::String(String::new()));
    }

    Worksheet::new("Лист1", range)
}

fn bench_cell_parsing(c: &mut Criterion) {
    let parser = CellParser::new();
    let day_first = CellValue::text("31.12.2024");
    let serial = CellValue::Numeric(45657.5);
    let decimal = CellValue::text("-12.35");

    c.bench_function("parse_text_date_fallthrough", |b| {
        b.iter(|| parser.parse_date(black_box(&day_first)))
    });

    c.bench_function("parse_serial_time", |b| {
        b.iter(|| parser.parse_time(black_box(&serial)))
    });

    c.bench_function("parse_text_decimal", |b| {
        b.iter(|| parser.parse_decimal(black_box(&decimal)))
    });
}

fn bench_row_parsing(c: &mut Criterion) {
    let rows = RowParser::default();
    let validator = RecordValidator::new();
    let cells = observation_cells(12);

    c.bench_function("parse_row", |b| {
        b.iter(|| rows.parse_cells(black_box(&cells)))
    });

    let record = rows.parse_cells(&cells);
    c.bench_function("validate_record", |b| {
        b.iter(|| validator.is_valid(black_box(&record)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_sheet");
    let pipeline = ImportPipeline::new();

    for rows in [248u32, 2920] {
        let sheet = create_sheet(rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &sheet, |b, sheet| {
            b.iter(|| pipeline.import_sheets(black_box(std::slice::from_ref(sheet))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cell_parsing, bench_row_parsing, bench_pipeline);
criterion_main!(benches);
