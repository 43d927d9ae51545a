/// Conditional logging module for development builds
///
/// The `debug_log!` macro provides informational logging that is compiled out
/// in production (release) builds by default. Errors and warnings should continue
/// using `log::error!` and `log::warn!` directly.
///
/// Logging is enabled when either:
/// - Building in debug mode (`cfg(debug_assertions)`)
/// - The `console_logging` feature is explicitly enabled
///
/// # Examples
///
/// ```rust
/// use subway_lines::debug_log;
///
/// let line_name = "Line 2";
/// debug_log!("Loading line: {}", line_name);
/// ```
/// Conditionally log through the `log` facade in development builds
///
/// This macro expands to `log::debug!()` in debug builds or when the
/// `console_logging` feature is enabled. In production release builds,
/// it compiles to nothing.
#[macro_export]
macro_rules! debug_log {
    ($($arg:expr),+ $(,)?) => {
        #[cfg(any(debug_assertions, feature = "console_logging"))]
        {
            $crate::logging::__log::debug!($($arg),+);
        }
    };
}

pub use debug_log;

#[doc(hidden)]
pub use log as __log;
