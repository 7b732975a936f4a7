// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Feature score intake
//!
//! Reads JSON lines of the form `{"attention": 0.8, "relaxation": 0.2}`
//! from stdin on a dedicated blocking thread and keeps only the most
//! recent reading. The tick loop samples at its own cadence and holds the
//! last known good reading when the stream pauses; malformed lines are
//! logged and skipped so a glitchy upstream cannot stall the show.

use std::io::BufRead;

use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// One parsed reading from the feature stream.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeatureReading {
    pub attention: f64,
    pub relaxation: f64,
}

/// Latest-value handle onto the feature stream.
pub struct FeatureSource {
    rx: watch::Receiver<Option<FeatureReading>>,
}

impl FeatureSource {
    /// Spawn the stdin reader thread and return the sampling handle.
    pub fn spawn_stdin() -> Self {
        let (tx, rx) = watch::channel(None);
        std::thread::Builder::new()
            .name("feature-intake".to_string())
            .spawn(move || read_lines(std::io::stdin().lock(), tx))
            .expect("spawn feature intake thread");
        Self { rx }
    }

    /// Most recent reading, if any has arrived yet.
    pub fn latest(&self) -> Option<FeatureReading> {
        *self.rx.borrow()
    }
}

fn read_lines(reader: impl BufRead, tx: watch::Sender<Option<FeatureReading>>) {
    let mut parsed = 0u64;
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "feature stream read error, stopping intake");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<FeatureReading>(line) {
            Ok(reading) => {
                parsed += 1;
                if tx.send(Some(reading)).is_err() {
                    return;
                }
            }
            Err(e) => {
                debug!(error = %e, "skipping malformed feature line");
            }
        }
    }
    info!(readings = parsed, "feature stream ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_valid_lines() {
        let (tx, rx) = watch::channel(None);
        let input = b"{\"attention\": 0.8, \"relaxation\": 0.2}\n" as &[u8];
        read_lines(input, tx);

        let reading = rx.borrow().expect("one reading");
        assert_eq!(reading.attention, 0.8);
        assert_eq!(reading.relaxation, 0.2);
    }

    #[test]
    fn test_malformed_lines_skipped_and_stream_continues() {
        let (tx, rx) = watch::channel(None);
        let input = b"not json\n{\"attention\": 1}\n{\"attention\": 0.3, \"relaxation\": 0.9}\n"
            as &[u8];
        read_lines(input, tx);

        // Only the final well-formed line survives; the line missing
        // "relaxation" does not parse.
        let reading = rx.borrow().expect("one reading");
        assert_eq!(reading.attention, 0.3);
        assert_eq!(reading.relaxation, 0.9);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let (tx, rx) = watch::channel(None);
        let input = b"\n\n  \n" as &[u8];
        read_lines(input, tx);
        assert!(rx.borrow().is_none());
    }
}
