//! The control loop
//!
//! One task owns the bus. Each iteration it services a pending interrupt,
//! kicks the charger watchdog and sweeps closed subscribers when their
//! intervals have elapsed, then waits briefly for a command from a
//! [`ControllerHandle`]. All register access, including writes requested
//! from outside, happens here.

mod commands;
mod interrupt;
mod schedule;

pub use commands::{ControllerCommand, ControllerHandle};
pub use interrupt::InterruptFlag;
pub use schedule::Periodic;

use crate::config::Config;
use crate::events::{EventDecoder, EventSet};
use crate::flap::{FlapDetector, TripReport};
use crate::history::{HistoryLog, HistorySink};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::notify::{Notifier, SubscriberHub};
use crate::replay::{ReplayReport, replay};
use crate::writer::ValidatedWriter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, sleep};

/// ADC control register, written once after settings replay
pub const ADC_CONTROL_REGISTER: u8 = 0x2E;

pub struct Controller {
    writer: ValidatedWriter,
    decoder: EventDecoder,
    flap: FlapDetector,
    history: HistoryLog,
    hub: SubscriberHub,
    interrupt: Arc<InterruptFlag>,
    commands: mpsc::Receiver<ControllerCommand>,
    watchdog: Periodic,
    cleanup: Periodic,
    idle: Duration,
    adc_boot_control: Option<u8>,
    started: Instant,
    last_trip: Option<TripReport>,
    logger: StructuredLogger,
}

impl Controller {
    /// Build a controller and the handle used to talk to it
    pub fn new(
        config: &Config,
        writer: ValidatedWriter,
        history: HistoryLog,
        hub: SubscriberHub,
    ) -> (Self, ControllerHandle) {
        let (tx, rx) = mpsc::channel(config.controller.command_queue.max(1));
        let interrupt = Arc::new(InterruptFlag::new());
        let logger = get_logger_with_context(
            LogContext::new("controller").with_device_address(config.bus.i2c_address),
        );

        let controller = Self {
            writer,
            decoder: EventDecoder::new(),
            flap: FlapDetector::from_config(&config.flap),
            history,
            hub,
            interrupt: Arc::clone(&interrupt),
            commands: rx,
            watchdog: Periodic::new(config.timing.watchdog_interval_ms),
            cleanup: Periodic::new(config.timing.subscriber_cleanup_interval_ms),
            idle: Duration::from_millis(config.timing.loop_idle_ms),
            adc_boot_control: config.bus.adc_boot_control,
            started: Instant::now(),
            last_trip: None,
            logger,
        };
        (controller, ControllerHandle::new(tx, interrupt))
    }

    pub fn interrupt_flag(&self) -> Arc<InterruptFlag> {
        Arc::clone(&self.interrupt)
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn flap(&self) -> &FlapDetector {
        &self.flap
    }

    pub fn writer_mut(&mut self) -> &mut ValidatedWriter {
        &mut self.writer
    }

    /// Most recent protective action, if any
    pub fn last_trip(&self) -> Option<&TripReport> {
        self.last_trip.as_ref()
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Restore persisted settings, then start the ADC
    pub async fn boot(&mut self) -> ReplayReport {
        self.logger.info("Booting charger control plane");
        let report = replay(&mut self.writer).await;

        if let Some(control) = self.adc_boot_control {
            match self
                .writer
                .bus_mut()
                .write_byte(ADC_CONTROL_REGISTER, control)
                .await
            {
                Ok(()) => self.logger.info(&format!("ADC initialised (REG2E=0x{:02X})", control)),
                Err(e) => self.logger.error(&format!("Failed to initialise ADC: {}", e)),
            }
        }
        report
    }

    /// Decode the pending interrupt and fan the result out
    ///
    /// Order: broadcast, history, then the flap detector.
    pub async fn handle_interrupt(&mut self, now_ms: u64) -> EventSet {
        let events = self.decoder.decode(self.writer.bus_mut()).await;
        let json = events.to_json();
        self.logger.info(&format!("Interrupt: {}", json));

        self.hub.broadcast(&json);
        self.history.append(&json, now_ms);

        if let Some(report) = self
            .flap
            .process(
                &events,
                now_ms,
                &mut self.writer,
                &self.hub,
                &mut self.history,
            )
            .await
        {
            self.last_trip = Some(report);
        }
        events
    }

    /// One pass of the loop body at time `now_ms`
    pub async fn tick(&mut self, now_ms: u64) -> Option<EventSet> {
        let events = if self.interrupt.take() {
            Some(self.handle_interrupt(now_ms).await)
        } else {
            None
        };

        if self.watchdog.due(now_ms) {
            // Re-attempted every interval regardless of earlier failures
            if let Err(e) = self.writer.write("WD_RST", 1).await {
                self.logger.warn(&format!("Watchdog reset failed: {}", e));
            }
        }

        if self.cleanup.due(now_ms) {
            self.hub.cleanup_closed();
        }

        events
    }

    /// Run until a shutdown command arrives
    pub async fn run(&mut self) {
        self.logger.info("Control loop started");
        loop {
            let now = self.now_ms();
            self.tick(now).await;

            tokio::select! {
                Some(cmd) = self.commands.recv() => {
                    if self.handle_command(cmd).await.is_break() {
                        break;
                    }
                }
                _ = sleep(self.idle) => {}
            }
        }
        self.logger.info("Control loop stopped");
    }
}
