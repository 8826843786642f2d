use super::{Controller, InterruptFlag};
use crate::error::{ChargerError, Result};
use crate::history::HistoryEntry;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Requests served by the control loop
#[derive(Debug)]
pub enum ControllerCommand {
    Write {
        name: String,
        value: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    Read {
        name: String,
        reply: oneshot::Sender<Result<i64>>,
    },
    History {
        reply: oneshot::Sender<Vec<HistoryEntry>>,
    },
    MarkHistorySeen {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Cloneable front door to a running [`Controller`]
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<ControllerCommand>,
    interrupt: Arc<InterruptFlag>,
}

impl ControllerHandle {
    pub(super) fn new(tx: mpsc::Sender<ControllerCommand>, interrupt: Arc<InterruptFlag>) -> Self {
        Self { tx, interrupt }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ControllerCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ChargerError::channel("Controller is not running"))?;
        rx.await
            .map_err(|_| ChargerError::channel("Controller dropped the request"))
    }

    /// Validated write of one field
    pub async fn write(&self, name: &str, value: i64) -> Result<()> {
        let name = name.to_string();
        self.request(|reply| ControllerCommand::Write { name, value, reply })
            .await?
    }

    /// Read one field in physical units
    pub async fn read(&self, name: &str) -> Result<i64> {
        let name = name.to_string();
        self.request(|reply| ControllerCommand::Read { name, reply })
            .await?
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.request(|reply| ControllerCommand::History { reply })
            .await
    }

    pub async fn mark_history_seen(&self) -> Result<()> {
        self.request(|reply| ControllerCommand::MarkHistorySeen { reply })
            .await
    }

    /// Ask the loop to stop after the current iteration
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(ControllerCommand::Shutdown)
            .await
            .map_err(|_| ChargerError::channel("Controller is not running"))
    }

    /// Latch shared with the control loop, for the interrupt source
    pub fn interrupt_flag(&self) -> Arc<InterruptFlag> {
        Arc::clone(&self.interrupt)
    }
}

impl Controller {
    pub(crate) async fn handle_command(&mut self, cmd: ControllerCommand) -> ControlFlow<()> {
        match cmd {
            ControllerCommand::Write { name, value, reply } => {
                let result = self.writer.write(&name, value).await;
                let _ = reply.send(result);
            }
            ControllerCommand::Read { name, reply } => {
                let result = self.writer.read(&name).await;
                let _ = reply.send(result);
            }
            ControllerCommand::History { reply } => {
                let _ = reply.send(self.history.entries());
            }
            ControllerCommand::MarkHistorySeen { reply } => {
                self.history.mark_all_seen();
                let _ = reply.send(());
            }
            ControllerCommand::Shutdown => {
                self.logger.info("Shutdown requested");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}
