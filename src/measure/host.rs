//! Command and event channels between the measuring view and its host.
//!
//! The host owns a [`HostLink`]; the plugin owns the matching
//! [`MeasureLink`]. Commands are drained on the update thread, so the
//! session is only ever mutated from one place.

use bevy::prelude::*;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use serde::Deserialize;

use crate::capture::CaptureResult;
use crate::units::Unit;

/// Options passed with the start command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    /// Required: keep earlier measurements when a new one starts
    pub allow_multiple_points: bool,
    /// Initial unit (defaults to centimeter)
    #[serde(default)]
    pub unit: Unit,
    /// Close the view once a capture result has been delivered
    #[serde(default = "default_close_on_capture")]
    pub close_on_capture: bool,
}

fn default_close_on_capture() -> bool {
    true
}

impl StartOptions {
    pub fn new(allow_multiple_points: bool) -> Self {
        Self {
            allow_multiple_points,
            unit: Unit::default(),
            close_on_capture: default_close_on_capture(),
        }
    }

    /// Parse the host's JSON options.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, String> {
        serde_json::from_value(value.clone())
            .map_err(|e| format!("Invalid start options: {}", e))
    }
}

/// Requests from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Open a session with raw JSON options
    Start(serde_json::Value),
    SetUnit(Unit),
    Reset,
    Capture,
    Close,
}

/// Notifications to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    MeasurementCommitted(String),
    CaptureComplete(CaptureResult),
    Closed,
    StartFailed(String),
}

/// Host side of the link.
pub struct HostLink {
    commands: Sender<HostCommand>,
    events: Receiver<HostEvent>,
}

impl HostLink {
    pub fn send(&self, command: HostCommand) {
        if self.commands.send(command).is_err() {
            warn!("Measure view is gone, command dropped");
        }
    }

    /// Next pending event, if any.
    pub fn try_event(&self) -> Option<HostEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn drain_events(&self) -> Vec<HostEvent> {
        self.events.try_iter().collect()
    }
}

/// Plugin side of the link.
#[derive(Resource, Clone)]
pub struct MeasureLink {
    commands: Receiver<HostCommand>,
    /// Lets in-view controls queue commands behind host commands
    loopback: Sender<HostCommand>,
    events: Sender<HostEvent>,
}

impl MeasureLink {
    pub fn drain_commands(&self) -> Vec<HostCommand> {
        self.commands.try_iter().collect()
    }

    pub fn command_sender(&self) -> Sender<HostCommand> {
        self.loopback.clone()
    }

    pub fn event_sender(&self) -> Sender<HostEvent> {
        self.events.clone()
    }

    pub fn emit(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            warn!("Host stopped listening, event dropped");
        }
    }
}

/// Create a connected pair of link ends.
pub fn host_link() -> (HostLink, MeasureLink) {
    let (command_tx, command_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();
    (
        HostLink {
            commands: command_tx.clone(),
            events: event_rx,
        },
        MeasureLink {
            commands: command_rx,
            loopback: command_tx,
            events: event_tx,
        },
    )
}
