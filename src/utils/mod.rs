pub mod date;

pub use date::{format_time, parse_time_expr};
