use fire_bench::{BenchmarkReport, ConcurrencyResult, PERCENTILES};
use std::fmt::Write;

/// Render the report as a boxed text table, one row per concurrency level.
///
/// Latency columns are only shown when at least one level had a successful request; levels
/// without latencies leave those cells blank.
pub fn render_table(report: &BenchmarkReport) -> String {
    let with_latency = report.iter().any(|row| row.latency.is_some());

    let mut header = vec![
        "Concurrency Level".to_string(),
        "Duration (s)".to_string(),
        "Successful Requests".to_string(),
        "Total Errors".to_string(),
        "Error Rate (%)".to_string(),
    ];
    if with_latency {
        header.extend(PERCENTILES.iter().map(|p| format!("p{p} Latency (ms)")));
    }

    let rows: Vec<Vec<String>> = report.iter().map(|r| cells(r, with_latency)).collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(col, title)| {
            rows.iter()
                .map(|row| row[col].len())
                .chain(std::iter::once(title.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(out, "{}", line(&header, &widths));
    let _ = writeln!(out, "{separator}");
    for row in &rows {
        let _ = writeln!(out, "{}", line(row, &widths));
    }
    let _ = write!(out, "{separator}");
    out
}

fn cells(result: &ConcurrencyResult, with_latency: bool) -> Vec<String> {
    let mut cells = vec![
        result.concurrency.to_string(),
        result.duration.as_secs().to_string(),
        result.successful_requests.to_string(),
        result.total_errors.to_string(),
        format!("{:.2}", result.error_rate * 100.),
    ];

    if with_latency {
        cells.extend(PERCENTILES.iter().map(|p| {
            result
                .latency
                .and_then(|latency| latency.get(*p))
                .map(|value| format!("{value:.2}"))
                .unwrap_or_default()
        }));
    }
    cells
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(line, " {cell:>width$} |");
    }
    line
}
