/// Failures talking to the order store actor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Order store closed")]
    ActorClosed,
    #[error("Order store dropped response channel")]
    ActorDropped,
}
