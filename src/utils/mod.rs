pub mod dates;
pub mod query_string;
pub mod text;

pub use dates::{format_boundary, parse_day};
pub use query_string::build_query_string;
pub use text::{is_present, non_blank, parse_csv_list, slugify};
