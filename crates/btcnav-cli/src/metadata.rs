use std::fmt::{Display, Formatter};

use btcnav_core::{EnvelopeMeta, ProviderId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request identifier (UUID v4) for end-to-end request tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Canonical command metadata payload used to construct envelope metadata.
///
/// Field order is fixed to keep deterministic JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub request_id: RequestId,
    pub source_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(
        source_chain: Vec<ProviderId>,
        latency_ms: u64,
        degraded: bool,
    ) -> Result<Self, ValidationError> {
        if source_chain.is_empty() {
            return Err(ValidationError::EmptySourceChain);
        }

        Ok(Self {
            request_id: RequestId::new_v4(),
            source_chain,
            latency_ms,
            degraded,
            warnings: Vec::new(),
        })
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn into_envelope_meta(self, schema_version: &str) -> Result<EnvelopeMeta, ValidationError> {
        let mut envelope_meta = EnvelopeMeta::new(
            self.request_id.to_string(),
            schema_version,
            self.source_chain,
            self.latency_ms,
            self.degraded,
        )?;

        for warning in self.warnings {
            envelope_meta.push_warning(warning);
        }

        Ok(envelope_meta)
    }

    /// Deterministic JSON representation with stable numeric formatting.
    ///
    /// `latency_ms` is emitted as an integer token, never scientific notation.
    pub fn to_deterministic_json(&self) -> Result<String, serde_json::Error> {
        let request_id = serde_json::to_string(self.request_id.to_string().as_str())?;
        let source_chain = serde_json::to_string(&self.source_chain)?;
        let warnings = serde_json::to_string(&self.warnings)?;

        Ok(format!(
            "{{\"request_id\":{request_id},\"source_chain\":{source_chain},\"latency_ms\":{},\"degraded\":{},\"warnings\":{warnings}}}",
            self.latency_ms,
            if self.degraded { "true" } else { "false" }
        ))
    }
}
