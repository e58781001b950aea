use anyhow::Context;
use sessionguard_types::SessionRow;

pub const REPORT_FILE_NAME: &str = "validation-report.csv";

/// `session.id, subject.code, session.label, template0 .. template{n-1}`.
pub fn report_headers(template_count: usize) -> Vec<String> {
    let mut headers = vec![
        "session.id".to_string(),
        "subject.code".to_string(),
        "session.label".to_string(),
    ];
    headers.extend((0..template_count).map(|i| format!("template{i}")));
    headers
}

/// One row per non-compliant session, in the order given. Template columns hold the reason
/// message for that template; missing values are empty cells.
pub fn render_report_csv(rows: &[SessionRow], template_count: usize) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(report_headers(template_count))?;

    for row in rows {
        let mut record = Vec::with_capacity(3 + template_count);
        record.push(row.session_id.as_deref().unwrap_or_default());
        record.push(row.subject_code.as_deref().unwrap_or_default());
        record.push(row.session_label.as_deref().unwrap_or_default());
        for i in 0..template_count {
            record.push(row.reasons.get(i).map(|r| r.message.as_str()).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("flush CSV report: {}", err.error()))?;
    String::from_utf8(bytes).context("CSV report is not UTF-8")
}
