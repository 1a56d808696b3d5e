pub mod export;
pub mod generator;

pub use export::{export_file_name, export_sessions_csv};
pub use generator::dashboard_markdown;
