//! Write session.
//!
//! A [`WriteSession`] turns a stream of events into records on rotating
//! destinations. The host drives it through the run and luminosity-block
//! lifecycle:
//!
//! ```text
//! begin_run
//!   begin_boundary(lumi)      -> destination (lumi, 0)
//!     write_event ...         -> rotates to (lumi, 1), (lumi, 2), ...
//!   end_boundary(lumi)
//!   ...
//! end_run
//! ```
//!
//! Encoding is atomic: a record reaches the consumer only when it has been
//! completely laid out and checksummed. Consumer and placement failures are
//! returned to the caller unchanged; nothing is retried or dropped.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::placement::Placement;
use crate::rotation::{RotationDecision, RotationPolicy};
use crate::stats::{BoundaryReport, SessionStats};
use rawout_codec::{EventIdentity, FragmentCollection, RecordEncoder};
use rawout_storage::OutputConsumer;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of writing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Index of the destination the record went to.
    pub destination_index: u32,
    /// Encoded record size in bytes.
    pub record_size: usize,
    /// Whether this event opened a new destination.
    pub rotated: bool,
}

/// Writes events of one run to rotating destinations.
pub struct WriteSession {
    config: Config,
    encoder: RecordEncoder,
    rotation: RotationPolicy,
    stats: SessionStats,
    consumer: Box<dyn OutputConsumer>,
    placement: Box<dyn Placement>,
    /// Queried once at construction.
    shared_mode: bool,
    run: Option<u32>,
    current_lumi: Option<u32>,
    /// Last block that ended, reported when the next one begins.
    previous_lumi: Option<u32>,
}

impl WriteSession {
    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the configuration is invalid. An
    /// unsupported format version is always caught here, never mid-run.
    pub fn new(
        config: Config,
        consumer: Box<dyn OutputConsumer>,
        placement: Box<dyn Placement>,
    ) -> CoreResult<Self> {
        let version = config.validate()?;
        let encoder = RecordEncoder::new(version, config.include_optional_flags);
        let rotation = RotationPolicy::new(config.events_per_destination);
        let shared_mode = consumer.is_shared_mode();

        Ok(Self {
            config,
            encoder,
            rotation,
            stats: SessionStats::new(),
            consumer,
            placement,
            shared_mode,
            run: None,
            current_lumi: None,
            previous_lumi: None,
        })
    }

    /// Starts the run and the consumer.
    ///
    /// # Errors
    ///
    /// Returns an error if a run is already active or the consumer fails to
    /// start.
    pub fn begin_run(&mut self, run: u32) -> CoreResult<()> {
        if let Some(active) = self.run {
            return Err(CoreError::invalid_operation(format!(
                "run {active} is still active"
            )));
        }
        self.consumer.start()?;
        self.run = Some(run);
        info!(
            run,
            source = %self.config.source_tag(),
            version = %self.encoder.version(),
            shared_mode = self.shared_mode,
            "run started"
        );
        Ok(())
    }

    /// Starts luminosity block `lumi` and opens its first destination.
    ///
    /// From the second block on, returns a report of the previous block.
    ///
    /// # Errors
    ///
    /// Returns an error if no run is active, another block is still open,
    /// or the destination cannot be opened.
    pub fn begin_boundary(&mut self, lumi: u32) -> CoreResult<Option<BoundaryReport>> {
        if self.run.is_none() {
            return Err(CoreError::invalid_operation(
                "begin_boundary called outside a run",
            ));
        }
        if let Some(open) = self.current_lumi {
            return Err(CoreError::invalid_operation(format!(
                "lumi {open} has not ended"
            )));
        }

        self.rotation.on_boundary();
        self.open_destination(lumi, 0)?;

        let now = Instant::now();
        let report = self.previous_lumi.map(|previous| {
            let report = self.stats.report(previous, now);
            info!(
                lumi = report.lumi,
                events = report.events,
                bytes = report.bytes,
                elapsed_us = report.elapsed.as_micros() as u64,
                rate_mb_s = report.megabytes_per_second(),
                "lumi statistics"
            );
            report
        });
        self.stats.reset(now);
        self.current_lumi = Some(lumi);
        Ok(report)
    }

    /// Encodes one event and passes it to the consumer.
    ///
    /// # Errors
    ///
    /// Returns an error if no block is open, the event belongs to another
    /// block, encoding fails, or the consumer fails. On error no record
    /// has been handed to the consumer.
    pub fn write_event(
        &mut self,
        identity: &EventIdentity,
        fragments: &FragmentCollection,
    ) -> CoreResult<WriteOutcome> {
        let lumi = self.current_lumi.ok_or_else(|| {
            CoreError::invalid_operation("write_event called outside a lumi block")
        })?;
        if identity.lumi != lumi {
            return Err(CoreError::invalid_operation(format!(
                "event {identity} does not belong to open lumi {lumi}"
            )));
        }

        // Rotation is only recorded once the new destination is open.
        let decision = self.rotation.peek();
        let rotated = match decision {
            RotationDecision::Rotate(index) => {
                self.open_destination(lumi, index)?;
                true
            }
            RotationDecision::Continue => false,
        };
        self.rotation.commit(decision);

        let record = self.encoder.encode(identity, fragments)?;
        let record_size = record.total_size();

        if self.shared_mode {
            self.consumer.hand_off(record.into_bytes())?;
        } else {
            self.consumer.write_record(record.as_bytes())?;
        }
        self.stats.record_event(record_size as u64);

        Ok(WriteOutcome {
            destination_index: self.rotation.current_index(),
            record_size,
            rotated,
        })
    }

    /// Ends luminosity block `lumi`.
    ///
    /// # Errors
    ///
    /// Returns an error if `lumi` is not the open block or the consumer
    /// fails to close it.
    pub fn end_boundary(&mut self, lumi: u32) -> CoreResult<()> {
        match self.current_lumi {
            Some(open) if open == lumi => {}
            Some(open) => {
                return Err(CoreError::invalid_operation(format!(
                    "cannot end lumi {lumi} while lumi {open} is open"
                )))
            }
            None => {
                return Err(CoreError::invalid_operation(format!(
                    "cannot end lumi {lumi}: no lumi is open"
                )))
            }
        }

        if self.stats.events() == 0 {
            warn!(lumi, "lumi ended without events");
        }
        self.consumer.end_of_boundary(lumi)?;
        self.current_lumi = None;
        self.previous_lumi = Some(lumi);
        Ok(())
    }

    /// Ends the run and stops the consumer.
    ///
    /// # Errors
    ///
    /// Returns an error if no run is active, a block is still open, or the
    /// consumer fails to stop.
    pub fn end_run(&mut self) -> CoreResult<()> {
        let run = self
            .run
            .ok_or_else(|| CoreError::invalid_operation("end_run called without a run"))?;
        if let Some(open) = self.current_lumi {
            return Err(CoreError::invalid_operation(format!(
                "cannot end run {run} while lumi {open} is open"
            )));
        }
        self.consumer.stop()?;
        self.run = None;
        info!(run, total_bytes = self.stats.total_bytes(), "run stopped");
        Ok(())
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Statistics of the current block.
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Rotation state.
    #[must_use]
    pub fn rotation(&self) -> &RotationPolicy {
        &self.rotation
    }

    /// Whether records are handed off rather than written.
    #[must_use]
    pub fn is_shared_mode(&self) -> bool {
        self.shared_mode
    }

    /// The open luminosity block, if any.
    #[must_use]
    pub fn current_lumi(&self) -> Option<u32> {
        self.current_lumi
    }

    fn open_destination(&mut self, lumi: u32, index: u32) -> CoreResult<()> {
        let dir = self.placement.destination_dir()?;
        let name = self.placement.destination_name(lumi, index)?;
        debug!(lumi, index, dir = %dir.display(), name = %name, "opening destination");
        self.consumer.initialize(&dir, &name, lumi)?;
        Ok(())
    }
}

impl std::fmt::Debug for WriteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSession")
            .field("config", &self.config)
            .field("rotation", &self.rotation)
            .field("shared_mode", &self.shared_mode)
            .field("run", &self.run)
            .field("current_lumi", &self.current_lumi)
            .finish_non_exhaustive()
    }
}
