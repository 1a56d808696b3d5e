pub mod category;
pub mod format;
pub mod task;

pub use category::{default_categories, is_valid_hex, parse_hex, Category};
pub use format::{format_clock, format_date, format_time};
pub use task::{elapsed_seconds, Task, TaskUpdate, TimeSession};
