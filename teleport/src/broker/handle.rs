use std::fmt;

use crate::subject::Subscription;

/// Cancels the subscriptions created by one `receive` or `multi_receive` call.
///
/// Clearing affects only those subscriptions: other receivers of the same names, and any join
/// group state, are left alone. Clearing twice is harmless. Dropping a handle without clearing
/// leaves the receivers active.
pub struct Handle {
    subscriptions: Vec<Subscription>,
}

impl Handle {
    pub(crate) fn new(subscriptions: Vec<Subscription>) -> Self {
        Self { subscriptions }
    }

    pub(crate) fn into_subscriptions(self) -> Vec<Subscription> {
        self.subscriptions
    }

    /// Unsubscribe everything this handle covers.
    pub fn clear(&self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }

    /// Returns `true` once every covered subscription is gone.
    pub fn is_cleared(&self) -> bool {
        self.subscriptions.iter().all(Subscription::is_closed)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("subscriptions", &self.subscriptions.len())
            .field("cleared", &self.is_cleared())
            .finish()
    }
}
