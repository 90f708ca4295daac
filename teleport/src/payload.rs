//! Type-erased event data and the envelope wrapped around every emission.
//!
//! Emitters hand the broker any `T: Any + Send + Sync`. The value is stored once behind an `Arc`
//! as a [`Payload`] and shared by every receiver of that delivery. Receivers get the value back
//! with a checked downcast, the same way the broker recovers a concrete stream from its erased
//! storage.

use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

/// Completion callback attached to an emission.
///
/// Runs once per delivery, right after the receiving handler returns.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// A shared, type-erased event value.
///
/// Cloning is cheap (reference count bump); every clone points at the same value.
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Payload {
    /// Wrap a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns a reference to the value if it is a `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_ref().downcast_ref::<T>()
    }

    /// Returns `true` if the value is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.as_ref().type_id() == TypeId::of::<T>()
    }

    /// The Rust type name of the wrapped value, for diagnostics.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if both payloads share the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Payload) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload<{}>", self.type_name)
    }
}

/// One emission as seen by receivers: the data plus an optional completion callback.
///
/// The broker stamps each envelope with an emission number, unique per broker and starting at
/// 1. Envelopes built directly carry 0.
#[derive(Clone)]
pub struct Envelope {
    data: Payload,
    callback: Option<Callback>,
    emission: u64,
}

impl Envelope {
    /// Create an envelope.
    pub fn new(data: Payload, callback: Option<Callback>) -> Self {
        Self {
            data,
            callback,
            emission: 0,
        }
    }

    pub fn with_emission(mut self, emission: u64) -> Self {
        self.emission = emission;
        self
    }

    /// The emission number, shared by every delivery of this emission.
    #[inline]
    pub fn emission(&self) -> u64 {
        self.emission
    }

    /// The emitted data.
    #[inline]
    pub fn data(&self) -> &Payload {
        &self.data
    }

    /// Run the completion callback, if any.
    #[inline]
    pub fn complete(&self) {
        if let Some(callback) = &self.callback {
            callback();
        }
    }

    /// Returns `true` if a completion callback is attached.
    #[inline]
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("data", &self.data)
            .field("callback", &self.callback.is_some())
            .field("emission", &self.emission)
            .finish()
    }
}
