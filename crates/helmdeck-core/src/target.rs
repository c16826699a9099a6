//! Release targets

use crate::error::Result;
use crate::options::{InstallationOptions, Layered, ServerOperationOptions, TestOptions, ValueOptions};
use crate::tags::TagExpression;

/// A named deployment destination with its own defaults
#[derive(Debug, Clone)]
pub struct ReleaseTarget {
    name: String,

    /// Connection and server-operation defaults
    pub server: ServerOperationOptions,

    /// Install flag defaults
    pub install: InstallationOptions,

    /// Values applied to every release installed to this target
    pub values: ValueOptions,

    /// Test defaults
    pub test: TestOptions,

    select_tags: Option<String>,
    selector: TagExpression,
}

impl ReleaseTarget {
    /// Create a target without defaults that selects every release
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: ServerOperationOptions::default(),
            install: InstallationOptions::default(),
            values: ValueOptions::default(),
            test: TestOptions::default(),
            select_tags: None,
            selector: TagExpression::always_match(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the tag selector, failing fast on malformed expressions
    pub fn set_select_tags(&mut self, expression: &str) -> Result<()> {
        self.selector = TagExpression::parse(expression)?;
        self.select_tags = Some(expression.to_string());
        Ok(())
    }

    /// Builder form of [`ReleaseTarget::set_select_tags`]
    pub fn with_select_tags(mut self, expression: &str) -> Result<Self> {
        self.set_select_tags(expression)?;
        Ok(self)
    }

    /// The selector as written, if any
    pub fn select_tags(&self) -> Option<&str> {
        self.select_tags.as_deref()
    }

    /// Compiled selector; match-all when none was set
    pub fn selector(&self) -> &TagExpression {
        &self.selector
    }

    /// Fill unset server and install options from build-wide defaults
    pub fn apply_global_defaults(
        &mut self,
        server: &ServerOperationOptions,
        install: &InstallationOptions,
    ) {
        self.server.conventions_from(server);
        self.install.conventions_from(install);
    }
}
