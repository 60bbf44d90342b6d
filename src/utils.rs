//! # Utility Functions Module
//!
//! Helpers for building external command lines. Arguments are kept as
//! `OsString` so input paths that are not valid UTF-8 still reach the engine
//! unchanged.

use std::ffi::{OsStr, OsString};

/// Collects string-like and path-like items into owned command arguments.
///
/// # Example
/// ```rust,ignore
/// let args = to_os_args(["-i".as_ref(), input.as_os_str()]);
/// ```
pub fn to_os_args<'a, I>(items: I) -> Vec<OsString>
where
    I: IntoIterator<Item = &'a OsStr>,
{
    items.into_iter().map(OsStr::to_os_string).collect()
}

/// Renders arguments for a log line, quoting the ones containing spaces.
pub fn display_command(program: &OsStr, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(|arg| {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                format!("\"{}\"", arg)
            } else {
                arg.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds a `Vec<OsString>` from anything implementing `AsRef<OsStr>`,
/// mixing literals and paths freely.
///
/// # Example
/// ```rust,ignore
/// let args = args!["-i", input_path, "-crf", "23"];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_os_args([$(::std::convert::AsRef::<::std::ffi::OsStr>::as_ref(&$item)),*])
    };
}
