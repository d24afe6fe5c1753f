use crate::domain::event::LifecycleEvent;
use crate::error::{BridgeError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum StepKind {
    Event,
    Ready,
    Wallet,
    Emit,
    Connect,
    Disconnect,
    ConnectError,
    ReconnectAttempt,
    ReconnectFailed,
    Close,
}

#[derive(Debug, Deserialize)]
struct ScriptRow {
    kind: StepKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    payload: String,
}

/// One step of a recorded session.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// A server-pushed event.
    Event { name: String, payload: Value },
    /// The host runtime signalled readiness.
    Ready,
    /// The host registered its active wallet.
    SetWallet(String),
    /// The host emitted an event towards the server (raw JSON text).
    Emit { name: String, json: String },
    Lifecycle(LifecycleEvent),
    Close,
}

impl TryFrom<ScriptRow> for ScriptStep {
    type Error = BridgeError;

    fn try_from(row: ScriptRow) -> Result<Self> {
        let step = match row.kind {
            StepKind::Event => {
                if row.name.is_empty() {
                    return Err(BridgeError::ScriptError("event without a name".to_string()));
                }
                let payload = if row.payload.is_empty() {
                    Value::Null
                } else {
                    serde_json::from_str(&row.payload)?
                };
                ScriptStep::Event {
                    name: row.name,
                    payload,
                }
            }
            StepKind::Ready => ScriptStep::Ready,
            StepKind::Wallet => ScriptStep::SetWallet(row.payload),
            StepKind::Emit => ScriptStep::Emit {
                name: row.name,
                json: row.payload,
            },
            StepKind::Connect => ScriptStep::Lifecycle(LifecycleEvent::Connected {
                socket_id: row.payload,
            }),
            StepKind::Disconnect => ScriptStep::Lifecycle(LifecycleEvent::Disconnected {
                reason: row.payload,
            }),
            StepKind::ConnectError => ScriptStep::Lifecycle(LifecycleEvent::ConnectError {
                message: row.payload,
            }),
            StepKind::ReconnectAttempt => {
                let attempt = row.payload.trim().parse().map_err(|_| {
                    BridgeError::ScriptError(format!("bad reconnect attempt {:?}", row.payload))
                })?;
                ScriptStep::Lifecycle(LifecycleEvent::ReconnectAttempt { attempt })
            }
            StepKind::ReconnectFailed => ScriptStep::Lifecycle(LifecycleEvent::ReconnectFailed),
            StepKind::Close => ScriptStep::Close,
        };
        Ok(step)
    }
}

/// Reads a recorded session script from CSV.
///
/// Columns are `kind,name,payload`. Rows are parsed lazily, so a bad row yields an
/// error without stopping the rest of the script.
pub struct ScriptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScriptReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn steps(self) -> impl Iterator<Item = Result<ScriptStep>> {
        self.reader
            .into_deserialize::<ScriptRow>()
            .map(|result| result.map_err(BridgeError::from).and_then(ScriptStep::try_from))
    }
}
