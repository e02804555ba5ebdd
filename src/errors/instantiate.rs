/// Failures raised while constructing a value: user factory/constructor errors
/// and malformed trailing constructor parameters.
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Missing constructor argument at position {index}")]
    MissingArgument { index: usize },
    #[error("Constructor argument at position {index} has an unexpected type")]
    ArgumentType { index: usize },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
