#[derive(Debug)]
pub enum EngineError {
    /// A dispatch collaborator raised while handling a step.
    Dispatch { key: String, message: String },
    /// A step referenced a key shape the engine doesn't recognise.
    UnknownStepType(String),
    /// A transaction was requested but no zData step named a `$alias` model.
    NoTransactionAlias,
    /// Nesting a second transaction inside an already-active one.
    NestedTransaction(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Dispatch { key, message } => write!(f, "dispatch error on '{key}': {message}"),
            EngineError::UnknownStepType(key) => write!(f, "unknown step type for '{key}'"),
            EngineError::NoTransactionAlias => {
                write!(f, "_transaction requested but no zData step names a $alias model")
            }
            EngineError::NestedTransaction(alias) => write!(f, "transaction already active on '{alias}'"),
        }
    }
}

impl std::error::Error for EngineError {}

zolo_core::map_error! {
    EngineError => Internal,
}
