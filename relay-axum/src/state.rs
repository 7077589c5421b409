use relay_core::RelayApp;

/// Router state: the shared, immutable relay app.
#[derive(Clone)]
pub struct RelayAxumState {
    pub app: RelayApp,
}

impl RelayAxumState {
    pub fn new(app: RelayApp) -> Self {
        Self { app }
    }
}
