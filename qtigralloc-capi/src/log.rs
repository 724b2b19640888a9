// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

use log::{LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once, PoisonError};

pub type LoggerCallback = Box<dyn Fn(&Record) + Send>;

struct Logger {
    callback: Mutex<Option<LoggerCallback>>,
}

impl Logger {
    fn update(&self, cb: LoggerCallback) {
        let mut callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        *callback = Some(cb);
    }
}

impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, rec: &Record) {
        let callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(callback) = callback.as_ref() {
            callback(rec);
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger {
    callback: Mutex::new(None),
};

pub fn init(max_lv: LevelFilter, cb: LoggerCallback) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = log::set_logger(&LOGGER);
    });

    LOGGER.update(cb);
    log::set_max_level(max_lv);
}
