//! Errors reported by the broker.
//!
//! Only malformed subscriptions are errors. They are reported synchronously by the call that
//! tried to create them. Everything else (emitting to an unknown name, removing twice, clearing
//! an empty broker) is accepted as a no-op.

use std::fmt;

use crate::name::EventName;

/// A subscription the broker refuses to create.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A join was requested over an empty list of events.
    EmptyGroup,
    /// A join listed the same event more than once.
    DuplicateMember(EventName),
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// ```
    /// assert_eq!(teleport::Error::EmptyGroup.as_label(), "empty_group");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::EmptyGroup => "empty_group",
            Error::DuplicateMember(_) => "duplicate_member",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyGroup => write!(f, "invalid observer shape: join needs at least one event"),
            Error::DuplicateMember(name) => {
                write!(f, "invalid observer shape: event {name:?} listed more than once")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Check a join member list.
pub(crate) fn validate_group(names: &[EventName]) -> Result<(), Error> {
    if names.is_empty() {
        return Err(Error::EmptyGroup);
    }
    for (index, name) in names.iter().enumerate() {
        if names[..index].contains(name) {
            return Err(Error::DuplicateMember(name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_is_rejected() {
        assert_eq!(validate_group(&[]), Err(Error::EmptyGroup));
    }

    #[test]
    fn duplicate_member_is_rejected() {
        let names: Vec<EventName> = vec!["a".into(), "b".into(), "a".into()];

        assert_eq!(
            validate_group(&names),
            Err(Error::DuplicateMember("a".into()))
        );
    }

    #[test]
    fn distinct_members_are_accepted() {
        let names: Vec<EventName> = vec!["a".into(), "b".into()];

        assert_eq!(validate_group(&names), Ok(()));
    }

    #[test]
    fn display_and_labels() {
        let err = Error::DuplicateMember("tick".into());

        assert_eq!(err.as_label(), "duplicate_member");
        assert_eq!(
            err.to_string(),
            "invalid observer shape: event \"tick\" listed more than once"
        );
    }
}
