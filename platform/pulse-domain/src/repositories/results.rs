use crate::value_objects::period::Period;
use crate::value_objects::summary_record::SummaryRecord;
use crate::value_objects::timeline_row::TimelineRow;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "performance_summary.csv";

/// Expected files under a results directory: the summary first, then one
/// timeline per period in display order.
pub fn expected_files(results_dir: &Path) -> Vec<PathBuf> {
    let mut files = vec![results_dir.join(SUMMARY_FILE)];
    files.extend(
        Period::ALL
            .iter()
            .map(|p| results_dir.join(p.timeline_file())),
    );
    files
}

pub trait ResultsRepository {
    fn exists(&self, path: &Path) -> bool;
    fn load_summary(&self, path: &Path) -> Result<Vec<SummaryRecord>, String>;
    fn load_timeline(&self, path: &Path) -> Result<Vec<TimelineRow>, String>;
}
