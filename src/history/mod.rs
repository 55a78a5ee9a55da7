mod timeline;
pub use timeline::{
    HistoryRecord, StudentTimeline, Timeline, TimelinePoint, build_timeline, key_dates,
    student_series,
};

mod import;
pub use import::{
    HistoryImport, ImportError, ImportReport, ImportRow, ParsedHistory, parse_history_csv,
};
