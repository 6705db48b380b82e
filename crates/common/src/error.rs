use std::fmt::Display;

/// An error that can carry a bare message, such as "connect to host: refused".
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Build `E` from a failure and a label naming what was being attempted.
pub fn labelled<E: FromMessage>(label: &str, source: impl Display) -> E {
    E::from_message(format!("{label}: {source}"))
}

/// Adds a `Context` trait to the calling module so any
/// `Result<T, impl Display>` converts into the module's `Result<T>`,
/// prefixed with a label.
///
/// The caller's `Error` must implement [`FromMessage`].
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, label: &str) -> Result<T>;

            fn with_context<L: AsRef<str>>(self, label: impl FnOnce() -> L) -> Result<T>;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, label: &str) -> Result<T> {
                self.map_err(|e| $crate::error::labelled::<Error>(label, e))
            }

            fn with_context<L: AsRef<str>>(self, label: impl FnOnce() -> L) -> Result<T> {
                self.map_err(|e| $crate::error::labelled::<Error>(label().as_ref(), e))
            }
        }
    };
}
