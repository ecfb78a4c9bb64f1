// src/test_log.rs
// Captures `log` records emitted on the current thread so unit tests can
// assert on messages, levels and targets.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// One captured log line
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

thread_local! {
    static RECORDS: RefCell<Vec<CapturedRecord>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records.borrow_mut().push(CapturedRecord {
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            })
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Run `f` and return its result with every record it logged on this thread
pub(crate) fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedRecord>) {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    RECORDS.with(|records| records.borrow_mut().clear());
    let result = f();
    let records = RECORDS.with(|records| records.borrow_mut().drain(..).collect());
    (result, records)
}

/// Whether a record with `level` and `target` whose message equals `message` was logged
pub(crate) fn logged(records: &[CapturedRecord], level: Level, target: &str, message: &str) -> bool {
    records
        .iter()
        .any(|r| r.level == level && r.target == target && r.message == message)
}
