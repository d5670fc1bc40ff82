/// Why a raw record was left out of a normalized collection.
///
/// Rejections are expected and absorbed by the aggregator; they are
/// surfaced only for counting and debug logging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("record is not an object")]
    NotAnObject,

    #[error("record has no usable id")]
    MissingId,

    #[error("record has no usable {0}")]
    MissingField(&'static str),
}
