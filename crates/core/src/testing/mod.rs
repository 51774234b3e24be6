//! Testing utilities and mock implementations.
//!
//! Lets the conversion hook be exercised without real tools or a real
//! project configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use hexwav_core::testing::{MapOptions, MockRunner, ScriptedRun};
//!
//! let runner = MockRunner::new();
//! runner.push(ScriptedRun::success().creating("/build/firmware.wav")).await;
//!
//! let options = MapOptions::new().with("custom_hex2wav_auto_play", "yes");
//! let hook = ConversionHook::new(runner.clone(), options);
//! ```

mod mock_runner;

pub use mock_runner::{MockRunner, ScriptedRun};

use std::collections::HashMap;

use crate::config::OptionSource;

/// In-memory option source.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    values: HashMap<String, String>,
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl OptionSource for MapOptions {
    fn get_option(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
