use std::collections::HashSet;
use std::fmt;

/// What kind of thing is sending a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenderKind {
    Player,
    Console,
    Other,
}

impl fmt::Display for SenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Player => "players",
            Self::Console => "the console",
            Self::Other => "other senders",
        })
    }
}

/**
Whoever typed the command.

The core never stores an invoker; it only asks it questions during a parse.
Permission answers are expected to be stable for the duration of a single
parse, since the pipeline may ask about the same node more than once (for
instance while working out which argument is the last one to be parsed).
*/
pub trait Invoker: Send + Sync {
    /// A stable identity for this invoker, used to key cooldowns and pending
    /// confirmations.
    fn id(&self) -> &str;

    fn kind(&self) -> SenderKind;

    fn has_permission(&self, node: &str) -> bool;
}

/// An [`Invoker`] with a fixed set of permission nodes. `*` grants
/// everything.
#[derive(Debug, Clone)]
pub struct SimpleInvoker {
    id: String,
    kind: SenderKind,
    permissions: HashSet<String>,
}

impl SimpleInvoker {
    pub fn new(id: impl Into<String>, kind: SenderKind) -> Self {
        Self {
            id: id.into(),
            kind,
            permissions: HashSet::new(),
        }
    }

    pub fn player(id: impl Into<String>) -> Self {
        Self::new(id, SenderKind::Player)
    }

    pub fn console() -> Self {
        Self::new("console", SenderKind::Console).with_permission("*")
    }

    #[must_use]
    pub fn with_permission(mut self, node: impl Into<String>) -> Self {
        self.permissions.insert(node.into());
        self
    }
}

impl Invoker for SimpleInvoker {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> SenderKind {
        self.kind
    }

    fn has_permission(&self, node: &str) -> bool {
        self.permissions.contains("*") || self.permissions.contains(node)
    }
}
