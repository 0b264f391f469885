//! Transport strategy selection.
//!
//! Evaluated once per session on entry to `Initializing`; the outcome
//! decides which collaborator drives playback.

/// How a channel's transport URL will be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Segmented/adaptive manifest driven by an attached engine
    AdaptiveEngine,
    /// Adaptive manifest handed to a surface with native support
    NativeAdaptive,
    /// Progressive stream handed to the surface unchanged
    Direct,
}

/// Whether a transport URL indicates a segmented/adaptive manifest.
pub fn is_adaptive(url: &str, marker: &str) -> bool {
    url.contains(marker)
}

/// Picks the transport for a session, or `None` for a capability mismatch:
/// the adaptive format is indicated but neither an engine nor native
/// support exists, so no attempt is made.
pub fn select_transport(
    adaptive: bool,
    engine_available: bool,
    native_adaptive: bool,
) -> Option<TransportKind> {
    match (adaptive, engine_available, native_adaptive) {
        (false, _, _) => Some(TransportKind::Direct),
        (true, true, _) => Some(TransportKind::AdaptiveEngine),
        (true, false, true) => Some(TransportKind::NativeAdaptive),
        (true, false, false) => None,
    }
}
