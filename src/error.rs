//! Error taxonomy for isolation, construction, and lifecycle failures.
//!
//! Every failure is reported synchronously to the caller; nothing in this
//! crate logs-and-swallows, and nothing retries. Construction is assumed
//! deterministic, so a retry without changing the blueprint would fail the
//! same way.

use thiserror::Error;

/// Boxed error used as the cause of a [`Error::Construction`] failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the registry, the construction engine, and the
/// eligibility gate.
#[derive(Debug, Error)]
pub enum Error {
    /// An ineligible type was registered for isolation.
    ///
    /// Raised by [`Registry::create`](crate::Registry::create) before any
    /// per-thread machinery is prepared.
    #[error("cannot register type `{type_name}`: it is not protected")]
    Configuration {
        /// Fully-qualified name of the rejected type.
        type_name: &'static str,
    },

    /// Construction of an ineligible type was requested at call time.
    ///
    /// Defense-in-depth duplicate of [`Error::Configuration`]: the gate is
    /// consulted again on every construction, before the target name is even
    /// resolved against the loading context.
    #[error("type `{type_name}` is not protected")]
    IllegalArgument {
        /// Fully-qualified name of the rejected type.
        type_name: &'static str,
    },

    /// Member resolution or invocation failed.
    ///
    /// Covers a missing constructor or factory overload, an argument count
    /// mismatch, and failures raised by the invoked member itself. The
    /// original failure, when one exists, is preserved as the source.
    #[error("construction failed: {detail}")]
    Construction {
        /// Human-readable account of what could not be resolved or invoked.
        detail: String,
        /// The underlying failure, when the invoked member raised one.
        #[source]
        source: Option<BoxError>,
    },

    /// The constructed object does not satisfy the requested result
    /// interface, or a caller downcast the result to the wrong type.
    #[error("`{type_name}` does not implement `{interface}`")]
    TypeMismatch {
        /// Fully-qualified name of the concrete type that was constructed.
        type_name: &'static str,
        /// Name of the interface or type the caller requested.
        interface: &'static str,
    },

    /// A registry or loading context was used after `remove`.
    #[error("loading contexts for `{type_name}` have been removed")]
    Lifecycle {
        /// Fully-qualified name of the target type whose contexts are gone.
        type_name: &'static str,
    },
}

impl Error {
    /// A [`Error::Construction`] with no underlying cause.
    pub(crate) fn construction(detail: impl Into<String>) -> Self {
        Error::Construction {
            detail: detail.into(),
            source: None,
        }
    }

    /// A [`Error::Construction`] wrapping the failure raised by invoked code.
    pub(crate) fn construction_with(detail: impl Into<String>, source: BoxError) -> Self {
        Error::Construction {
            detail: detail.into(),
            source: Some(source),
        }
    }
}
