use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use shardline_engine::{names, Emission, Subscriber};

/// Writes every emission to stdout as one JSON line and counts them by name.
pub struct Printer {
    include_raw: bool,
    counts: Mutex<BTreeMap<&'static str, usize>>,
}

impl Printer {
    pub fn new(include_raw: bool) -> Self {
        Self {
            include_raw,
            counts: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn render(&self, emission: &Emission) -> Result<Option<String>> {
        if emission.name == names::RAW && !self.include_raw {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(emission)?))
    }
}

#[async_trait]
impl Subscriber for Printer {
    async fn on_event(&self, emission: &Emission) -> Result<()> {
        *self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(emission.name)
            .or_default() += 1;

        if let Some(line) = self.render(emission)? {
            println!("{line}");
        }
        Ok(())
    }
}
