use resilience::DiscoveryError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerError {
    #[error("No instance of '{0}' available")]
    NoInstanceAvailable(String),
    #[error("Customer service call failed: {0}")]
    RemoteCallFailed(String),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}
