pub mod comparison;
pub mod format;
pub mod series;
pub mod trades;
