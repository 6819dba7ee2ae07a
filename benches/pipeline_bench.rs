use agentkpi_pipeline::{aggregate, build_db, build_db_from_book, load_sources, SourceSheet};
use agentkpi_sheet::{Book, CellValue, Sheet};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const STATUSES: [&str; 4] = ["Present", "No Show", "Off", "Late"];
const VERDICTS: [&str; 2] = ["pass", "fail"];

/// Synthetic workbook with `days` days of activity for `agents` agents
fn synthetic_book(days: u32, agents: u32) -> Book {
    let keys: Vec<(String, String)> = (0..days)
        .flat_map(|d| (0..agents).map(move |a| (format!("2024-01-{:02}", d % 28 + 1), format!("{a:05}"))))
        .collect();

    let sheet = |source: SourceSheet, row: &dyn Fn(usize) -> Vec<CellValue>| {
        let rows = keys
            .iter()
            .enumerate()
            .map(|(i, (date, agent))| {
                let mut cells = vec![CellValue::from(date.as_str()), CellValue::from(agent.as_str())];
                cells.extend(row(i));
                cells
            })
            .collect();
        Sheet::from_columns(source.sheet_name(), source.required_columns(), rows).unwrap()
    };

    let mut book = Book::new();
    book.add_sheet(
        "CHO",
        sheet(SourceSheet::Attendance, &|i| vec![CellValue::from(STATUSES[i % 4])]),
    )
    .unwrap();
    book.add_sheet(
        "CHT",
        sheet(SourceSheet::CallHandling, &|i| {
            vec![
                CellValue::Int((i % 40) as i64),
                CellValue::Float(3.5 + (i % 7) as f64),
                CellValue::Float(0.5),
            ]
        }),
    )
    .unwrap();
    book.add_sheet(
        "CHD",
        sheet(SourceSheet::Satisfaction, &|i| {
            vec![
                CellValue::Int((i % 5 + 1) as i64),
                CellValue::from(if i % 3 == 0 { "No" } else { "Yes" }),
            ]
        }),
    )
    .unwrap();
    book.add_sheet(
        "CHE",
        sheet(SourceSheet::Evaluation, &|i| {
            (0..6).map(|k| CellValue::from(VERDICTS[(i + k) % 2])).collect()
        }),
    )
    .unwrap();
    book
}

fn bench_build_from_book(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_db_from_book");

    for agents in [10, 100, 500] {
        let book = synthetic_book(28, agents);
        group.bench_with_input(BenchmarkId::from_parameter(agents), &book, |b, book| {
            b.iter(|| build_db_from_book(black_box(book.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let sources = load_sources(synthetic_book(28, 200)).unwrap();

    for source in SourceSheet::ALL {
        group.bench_function(source.sheet_name(), |b| {
            b.iter(|| aggregate(black_box(sources.get(source)), source).unwrap())
        });
    }

    group.finish();
}

fn bench_build_from_bytes(c: &mut Criterion) {
    let bytes = synthetic_book(28, 100).to_xlsx_bytes().unwrap();
    c.bench_function("build_db_xlsx", |b| b.iter(|| build_db(black_box(&bytes)).unwrap()));
}

criterion_group!(benches, bench_build_from_book, bench_aggregate, bench_build_from_bytes);
criterion_main!(benches);
