use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("Message has neither text nor image")]
    EmptyBody,

    #[error("Message text is blank")]
    BlankText,

    #[error("Message id is empty")]
    EmptyId,
}
