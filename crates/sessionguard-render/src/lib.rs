//! Rendering of run artifacts: the CSV failure report and the YAML template list.
//!
//! Renderers are pure; writing files is the caller's job.

#![forbid(unsafe_code)]

mod csv_report;
mod template_list;

pub use csv_report::{REPORT_FILE_NAME, render_report_csv, report_headers};
pub use template_list::{TEMPLATE_LIST_FILE_NAME, render_template_list, template_key};
