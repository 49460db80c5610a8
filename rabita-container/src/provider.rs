//! Provider trait — a module of related binding registrations.
//!
//! Providers group related bindings together so applications register by
//! domain instead of one giant registration block:
//!
//! ```rust,ignore
//! app.add_provider(&MailProvider)?;
//! app.add_provider(&QueueProvider)?;
//! ```

use tracing::debug;

use crate::container::Container;
use crate::error::Result;
use crate::key::BindingKey;

/// A module that registers related bindings into a container.
pub trait Provider: Send + Sync {
    /// Register bindings and blueprints into the container.
    ///
    /// Called once, by [`Container::add_provider`]. Errors from eager
    /// factory bindings propagate out.
    fn register(&self, app: &Container) -> Result<()>;

    /// Optional: human-readable name for log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Optional: the keys this provider registers.
    fn provides(&self) -> Vec<BindingKey> {
        Vec::new()
    }
}

impl Container {
    /// Runs a provider's registrations against this container.
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<()> {
        debug!(provider = provider.name(), "Registering provider");
        provider.register(self)
    }
}
