#[derive(Debug)]
pub enum NavError {
    /// A malformed `zLink` expression or permission block.
    MalformedLink(String),
    /// A key-jump target that doesn't exist in the current block.
    InvalidKeyJump(String),
    /// `POP` reached the root scope with nothing left to pop.
    NothingToPop,
}

impl std::fmt::Display for NavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavError::MalformedLink(msg) => write!(f, "malformed zLink: {msg}"),
            NavError::InvalidKeyJump(key) => write!(f, "invalid key-jump target: {key}"),
            NavError::NothingToPop => write!(f, "nothing to pop"),
        }
    }
}

impl std::error::Error for NavError {}

zolo_core::map_error! {
    NavError => Navigation,
}
