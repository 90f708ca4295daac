//! Event names, symbols and group tokens.
//!
//! Every channel in the broker is keyed by an [`EventName`]: either a plain string or an
//! opaque [`Symbol`]. Symbols come in two flavours:
//!
//! - **Unique** symbols from [`Symbol::new`]: two calls never produce equal symbols, even with
//!   the same description.
//! - **Registry** symbols from [`Symbol::for_key`]: the same key always yields the same symbol,
//!   process-wide.
//!
//! A list of names is folded into a [`GroupToken`] to identify a join group. Tokens are
//! deterministic: the same ordered list always produces the same token, so repeated joins over
//! the same names share one coordinator.
//!
//! ```rust
//! use teleport::{EventName, GroupToken, Symbol};
//!
//! let ready = Symbol::for_key("ready");
//! let token = GroupToken::from_names(&[EventName::from("load"), EventName::from(ready)]);
//! let again = GroupToken::from_names(&[
//!     EventName::from("load"),
//!     EventName::from(Symbol::for_key("ready")),
//! ]);
//! assert_eq!(token, again);
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        Arc, LazyLock,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashMap;

/// Prefix of every group token.
const TOKEN_PREFIX: &str = "Teleport:";

/// Next identifier handed out to a new symbol.
static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(0);

/// Registry symbols by key.
static SYMBOL_REGISTRY: LazyLock<DashMap<Arc<str>, Symbol>> = LazyLock::new(DashMap::new);

/// An opaque symbolic event identifier.
///
/// Equality is identity: only clones of the same symbol (or registry symbols created with the
/// same key) compare equal. The description is for diagnostics only.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Arc<str>,
}

impl Symbol {
    /// Create a new symbol distinct from every other symbol.
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        }
    }

    /// Get the registry symbol for `key`, creating it on first use.
    ///
    /// Repeated calls with an equal key return equal symbols.
    pub fn for_key(key: &str) -> Self {
        if let Some(existing) = SYMBOL_REGISTRY.get(key) {
            return existing.value().clone();
        }
        let key: Arc<str> = Arc::from(key);
        SYMBOL_REGISTRY
            .entry(key.clone())
            .or_insert_with(|| Symbol::new(key))
            .value()
            .clone()
    }

    /// The description given at creation.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The process-unique identifier of this symbol.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})#{}", self.description, self.id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})#{}", self.description, self.id)
    }
}

/// The key of an event channel.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A string name. Equal strings name the same channel.
    Name(Arc<str>),
    /// A symbolic name.
    Symbol(Symbol),
}

impl EventName {
    /// Returns the string form if this is a string name.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventName::Name(name) => Some(name),
            EventName::Symbol(_) => None,
        }
    }

    /// Returns `true` for symbolic names.
    #[inline]
    pub fn is_symbol(&self) -> bool {
        matches!(self, EventName::Symbol(_))
    }
}

impl fmt::Debug for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventName::Name(name) => write!(f, "{name:?}"),
            EventName::Symbol(symbol) => write!(f, "{symbol:?}"),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventName::Name(name) => f.write_str(name),
            EventName::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        EventName::Name(Arc::from(name))
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        EventName::Name(Arc::from(name))
    }
}

impl From<&String> for EventName {
    fn from(name: &String) -> Self {
        EventName::Name(Arc::from(name.as_str()))
    }
}

impl From<Arc<str>> for EventName {
    fn from(name: Arc<str>) -> Self {
        EventName::Name(name)
    }
}

impl From<Symbol> for EventName {
    fn from(symbol: Symbol) -> Self {
        EventName::Symbol(symbol)
    }
}

impl From<&Symbol> for EventName {
    fn from(symbol: &Symbol) -> Self {
        EventName::Symbol(symbol.clone())
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}

/// Deterministic key of a join group, derived from its ordered member names.
///
/// Two tokens are equal exactly when their member lists are equal, element by element. The
/// rendered label (`"Teleport:"` followed by the comma-joined names) is for diagnostics and may
/// coincide for different lists, e.g. `["a,b", "c"]` and `["a", "b,c"]`.
#[derive(Clone)]
pub struct GroupToken {
    members: Arc<[EventName]>,
    label: Arc<str>,
}

impl GroupToken {
    /// Build the token for an ordered list of names.
    pub fn from_names(names: &[EventName]) -> Self {
        let joined = names
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        GroupToken {
            members: Arc::from(names),
            label: Arc::from(format!("{TOKEN_PREFIX}{joined}")),
        }
    }

    /// The rendered label.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// The member names, in order.
    #[inline]
    pub fn members(&self) -> &[EventName] {
        &self.members
    }
}

impl PartialEq for GroupToken {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for GroupToken {}

impl Hash for GroupToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.members.hash(state);
    }
}

impl fmt::Debug for GroupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupToken({})", self.label)
    }
}

impl fmt::Display for GroupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
