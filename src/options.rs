use std::time::Duration;

/// Per-command parsing behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOptions {
    /// Merge `"quoted spans"` into single tokens
    pub quoting: bool,

    /// Clean up text values before they're transformed and validated. See
    /// [`sanitize`][crate::sanitize::sanitize].
    pub sanitize: bool,

    /// Attach "did you mean" suggestions to parse failures and unknown
    /// subcommands
    pub suggestions: bool,

    /// Route to the most similar subcommand when there's no exact match, if
    /// its similarity (between 0 and 1) is strictly greater than this. `None`
    /// disables fuzzy routing.
    pub fuzzy: Option<f64>,

    /// Paged help for commands with subcommands. `None` disables it.
    pub help: Option<HelpOptions>,

    pub cooldown: Option<CooldownOptions>,

    /// Require running the command twice within this window. `None` disables
    /// confirmation.
    pub confirmation: Option<Duration>,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            quoting: true,
            sanitize: false,
            suggestions: true,
            fuzzy: Some(0.75),
            help: Some(HelpOptions::default()),
            cooldown: None,
            confirmation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpOptions {
    /// How many entries to show on each page
    pub page_size: usize,
}

impl Default for HelpOptions {
    fn default() -> Self {
        Self { page_size: 8 }
    }
}

/// Cooldown windows. Either timer can be used on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CooldownOptions {
    /// How long each invoker must wait between uses
    pub per_invoker: Option<Duration>,

    /// How long everyone must wait after anyone uses the command
    pub global: Option<Duration>,

    /// Invokers with this permission ignore cooldowns
    pub bypass_permission: Option<String>,
}

impl CooldownOptions {
    #[must_use]
    pub fn per_invoker(window: Duration) -> Self {
        Self {
            per_invoker: Some(window),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn global(window: Duration) -> Self {
        Self {
            global: Some(window),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bypass(mut self, node: impl Into<String>) -> Self {
        self.bypass_permission = Some(node.into());
        self
    }
}

/// Configuration for a [`Gate`][crate::gate::Gate]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Sweep expired entries once every this many gate checks. Zero disables
    /// lazy sweeping.
    pub sweep_interval: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { sweep_interval: 64 }
    }
}
