//! Per-call view of everything a sub-manager needs from outside its graph.

use lc_core::{ConnectorConfig, SegmentId};
use lc_network::{HostNotifier, NetworkHost};

/// Where the session is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Persisted records are being replayed.  Segment-change publishing is
    /// suppressed.
    Loading,
    #[default]
    Running,
}

/// Host access for one connection operation.
///
/// Built by [`ConnectionManager`](crate::ConnectionManager) for each public
/// call and handed to the sub-managers, which never hold on to it.
///
/// # Lifetimes
///
/// The borrows live for a single manager call.  The notifier is the only
/// mutable piece; the host is never written through the context.
pub struct ConnectorContext<'a, H, N> {
    pub host:     &'a H,
    pub notifier: &'a mut N,
    pub config:   &'a ConnectorConfig,
    pub session:  SessionState,
}

impl<'a, H: NetworkHost, N: HostNotifier> ConnectorContext<'a, H, N> {
    #[inline]
    pub fn new(
        host:     &'a H,
        notifier: &'a mut N,
        config:   &'a ConnectorConfig,
        session:  SessionState,
    ) -> Self {
        Self { host, notifier, config, session }
    }

    /// Tell consistency listeners that `segment` changed, unless a load is in
    /// progress.
    pub fn publish_segment_changed(&mut self, segment: SegmentId) {
        if self.session == SessionState::Running {
            self.notifier.segment_changed(segment);
        }
    }
}
