//! Idempotent filesystem primitives (check + apply pattern).
pub mod archive;
pub mod compare;
pub mod copy;
pub mod helpers;
pub mod path;
pub mod symlink;

use anyhow::Result;

use archive::Archived;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the resource into its desired state.
    ///
    /// Implementations create missing parent directories and archive
    /// whatever occupies the destination before writing to it.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failures, permission problems, or a failed
    /// archive step.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a deployed path.
///
/// # Examples
///
/// ```
/// use dotpkg_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "points to /other".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(wrong, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the destination.
    Missing,
    /// The destination matches the source.
    Correct,
    /// Something exists at the destination but does not match.
    Incorrect {
        /// What is there instead.
        current: String,
    },
}

/// Result of applying a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The destination was (re)written.
    Applied {
        /// What happened to the previous destination content.
        archived: Archived,
    },
    /// The destination already matched; nothing was touched.
    AlreadyCorrect,
}

/// Resources that can determine their own state.
///
/// ```ignore
/// if resource.needs_change()? {
///     resource.apply()?;
/// }
/// ```
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(self.current_state()? != ResourceState::Correct)
    }
}
