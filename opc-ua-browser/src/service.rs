use crate::classify::classify;
use crate::convert::{parse_value, render_value};
use crate::error::{BrowserError, BrowserResult};
use crate::inventory::Inventory;
use crate::locator::find_by_name;
use crate::poller::{Poller, PollerState};
use crate::tag::TypeTag;
use opc_ua_client::{NodeHandle, SessionError, UaSession, Value, WriteResult};
use std::sync::Arc;
use std::time::Duration;

/// Tuning knobs for a [`Browser`].
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Interval between inventory rebuilds.
    pub poll_interval: Duration,
    /// Upper bound on any single server interaction (connect, one whole
    /// rebuild, one read, one write). Keeps a stalled server from blocking
    /// callers indefinitely.
    pub op_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            op_timeout: Duration::from_secs(30),
        }
    }
}

/// Caller-facing facade over the discovery/classification subsystem.
///
/// Owns the poller and the session handle; presentation layers talk to this
/// and never to the session directly.
pub struct Browser {
    session: Arc<dyn UaSession>,
    poller: Poller,
    op_timeout: Duration,
}

impl Browser {
    pub fn new(session: Arc<dyn UaSession>) -> Self {
        Self::with_config(session, BrowserConfig::default())
    }

    pub fn with_config(session: Arc<dyn UaSession>, config: BrowserConfig) -> Self {
        let poller = Poller::new(
            Arc::clone(&session),
            config.poll_interval,
            config.op_timeout,
        );
        Self {
            session,
            poller,
            op_timeout: config.op_timeout,
        }
    }

    /// Connect to `endpoint` (if not already connected) and begin the
    /// rebuild cycle.
    ///
    /// # Errors
    /// Returns [`BrowserError::Connection`] when the session cannot be
    /// established; the poller falls back to idle.
    pub async fn start_polling(&mut self, endpoint: &str) -> BrowserResult<()> {
        self.poller
            .start(endpoint)
            .await
            .map_err(BrowserError::Connection)
    }

    /// Stop the rebuild cycle. The last-known inventory stays readable.
    pub fn stop_polling(&mut self) {
        self.poller.stop();
    }

    pub fn state(&self) -> PollerState {
        self.poller.state()
    }

    /// The current complete inventory snapshot.
    pub fn snapshot(&self) -> Arc<Inventory> {
        self.poller.snapshot()
    }

    /// Tags present in the current inventory, in the fixed tag order.
    pub fn list_available_type_tags(&self) -> Vec<TypeTag> {
        self.poller.snapshot().tags()
    }

    /// Display entries for every node currently grouped under `tag`.
    ///
    /// Each node is re-read live and re-classified; nodes whose type has
    /// drifted since discovery, lost their value, or fail to read are
    /// omitted (logged, never fatal).
    pub async fn list_nodes_for_tag(&self, tag: &TypeTag) -> Vec<(String, String)> {
        let snapshot = self.poller.snapshot();
        let mut entries = Vec::new();
        for handle in snapshot.nodes_for(tag) {
            match self.read_current(handle).await {
                Ok(Some(value)) if classify(&value) == *tag => {
                    entries.push((handle.display_name.clone(), render_value(&value)));
                }
                Ok(Some(value)) => {
                    tracing::debug!(
                        node = %handle.node_id,
                        was = %tag,
                        now = %classify(&value),
                        "type drifted since discovery, entry omitted"
                    );
                }
                Ok(None) => {
                    tracing::debug!(node = %handle.node_id, "no value available, entry omitted");
                }
                Err(error) => {
                    tracing::warn!(
                        node = %handle.node_id,
                        name = %handle.display_name,
                        error = %error,
                        "read failed, entry omitted"
                    );
                }
            }
        }
        entries
    }

    /// Write `raw_text` to the node named `display_name`.
    ///
    /// The node's current value determines the target type; the text is
    /// converted to that type and written. The returned [`WriteResult`] is
    /// always `Good`; a server-side rejection comes back as
    /// [`BrowserError::WriteRejected`] carrying the server's code and
    /// description, and the write is not applied.
    ///
    /// # Errors
    /// [`BrowserError::NotFound`] when no node matches, `Read` when the
    /// current value cannot be read, `Conversion` when the text does not
    /// parse, `Write`/`WriteRejected` when delivery or the server fails it.
    pub async fn write_by_name(
        &self,
        display_name: &str,
        raw_text: &str,
    ) -> BrowserResult<WriteResult> {
        let snapshot = self.poller.snapshot();
        let handle = find_by_name(&snapshot, display_name).ok_or_else(|| {
            BrowserError::NotFound {
                name: display_name.to_string(),
            }
        })?;

        let current = self
            .read_current(handle)
            .await
            .map_err(|source| BrowserError::Read {
                name: handle.display_name.clone(),
                source,
            })?
            .ok_or_else(|| BrowserError::Read {
                name: handle.display_name.clone(),
                source: SessionError::Read {
                    node: handle.node_id.clone(),
                    message: "no value available to derive the target type".into(),
                },
            })?;

        let target = classify(&current);
        let value = parse_value(raw_text, &target)?;

        let written = tokio::time::timeout(
            self.op_timeout,
            self.session.write_value(&handle.node_id, value),
        )
        .await;
        let outcome = match written {
            Ok(inner) => inner,
            Err(_) => Err(SessionError::Timeout {
                operation: "write",
                secs: self.op_timeout.as_secs(),
            }),
        }
        .map_err(|source| BrowserError::Write {
            name: handle.display_name.clone(),
            source,
        })?;

        if outcome.is_good() {
            tracing::info!(node = %handle.node_id, tag = %target, "write applied");
            Ok(outcome)
        } else {
            tracing::warn!(
                node = %handle.node_id,
                code = outcome.code,
                description = %outcome.description,
                "server rejected write"
            );
            Err(BrowserError::WriteRejected {
                code: outcome.code,
                description: outcome.description,
            })
        }
    }

    async fn read_current(&self, handle: &NodeHandle) -> Result<Option<Value>, SessionError> {
        tokio::time::timeout(self.op_timeout, self.session.read_value(&handle.node_id))
            .await
            .map_err(|_| SessionError::Timeout {
                operation: "read",
                secs: self.op_timeout.as_secs(),
            })?
    }
}
