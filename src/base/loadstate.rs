/// The current state of an [`ApiRequest`](crate::restapi::request::ApiRequest).
///
/// A request is `Idle` until `run()` is called, `Fetching` while the
/// underlying network operation is pending, and `Complete` or `Failed`
/// once the outcome has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// The request has been constructed but not yet run.
    #[default]
    Idle,

    /// The network operation is in flight.
    Fetching,

    /// The request settled with a success outcome.
    Complete,

    /// The request settled with an error outcome.
    Failed,
}

impl LoadState {
    /// True once the request has settled, successfully or not.
    pub fn is_settled(self) -> bool {
        matches!(self, LoadState::Complete | LoadState::Failed)
    }
}
