//! Render-layer views of remotely fed progress.

use mastery_core::{FetchState, IntoProgressSource, ProgressSource, ProgressView, SourceId};

use crate::normalizer::normalize_source;

/// Build the view for a widget fed by `state`.
///
/// Anything but `Ready` renders the zero fallback source; `Failed` also
/// carries the error so the widget can label itself instead of showing a
/// plain 0%.
pub fn progress_view<P: IntoProgressSource>(id: &SourceId, state: &FetchState<P>) -> ProgressView {
    match state {
        FetchState::Ready(payload) => ProgressView {
            progress: normalize_source(&payload.to_progress_source(id)),
            error: None,
            loading: false,
        },
        FetchState::Failed(err) => ProgressView {
            progress: normalize_source(&ProgressSource::fallback(id.clone())),
            error: Some(err.clone()),
            loading: false,
        },
        FetchState::Idle | FetchState::Loading => ProgressView {
            progress: normalize_source(&ProgressSource::fallback(id.clone())),
            error: None,
            loading: true,
        },
    }
}
