pub type Result<T> = std::result::Result<T, MirrorError>;

/// Failures surfaced by the reflection engine.
///
/// Internal fallback chains (getter to field, setter to field) swallow intermediate
/// failures; only the final one reaches callers, rewritten to name the declaring type and
/// member.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MirrorError {
    #[error("can not find {what} [{owner}]->[{member}]")]
    MemberNotFound {
        what: &'static str,
        owner: String,
        member: String,
    },

    #[error("fail to get value for [{owner}]->[{name}]")]
    ValueReadFailure { owner: String, name: String },

    #[error("fail to set value [{value}] to [{owner}]->[{name}] because '{reason}'")]
    ValueWriteFailure {
        value: String,
        owner: String,
        name: String,
        reason: String,
    },

    #[error("{0}")]
    InvalidOperation(String),

    #[error("fail to invoke [{owner}]->[{method}]: {message}")]
    InvocationFailure {
        owner: String,
        method: String,
        message: String,
    },
}

impl MirrorError {
    pub(crate) fn not_found(
        what: &'static str,
        owner: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        MirrorError::MemberNotFound {
            what,
            owner: owner.into(),
            member: member.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MirrorError::InvalidOperation(message.into())
    }

    pub fn is_member_not_found(&self) -> bool {
        matches!(self, MirrorError::MemberNotFound { .. })
    }
}
