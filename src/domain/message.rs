use serde::{Deserialize, Serialize};

/// A host object plus the method invoked on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostTarget {
    pub object: String,
    pub method: String,
}

impl HostTarget {
    pub fn new(object: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            method: method.into(),
        }
    }
}

/// A message waiting for the host runtime to become ready.
///
/// Messages are kept in a FIFO buffer; creation order is delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferedMessage {
    pub target: String,
    pub method: String,
    pub body: String,
}

impl BufferedMessage {
    pub fn new(
        target: impl Into<String>,
        method: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
            body: body.into(),
        }
    }

    pub fn to(target: &HostTarget, body: impl Into<String>) -> Self {
        Self::new(target.object.clone(), target.method.clone(), body)
    }
}
