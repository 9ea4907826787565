//! Report and chart rendering.

pub mod charts;
pub mod generator;

pub use charts::{survival_by_gender_chart, top_families_chart, ChartStyle};
pub use generator::{
    generate_html_dashboard, generate_json_report, generate_markdown_report, write_report,
    RenderOptions,
};
