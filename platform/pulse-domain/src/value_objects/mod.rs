pub mod period;
pub mod signal;
pub mod summary_record;
pub mod timeline_row;
