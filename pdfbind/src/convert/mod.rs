//! Single-file format conversion.
//!
//! [`Dispatcher`] maps a (source, target) pair of [`FormatKind`]s to a
//! [`Strategy`]; [`submit_conversion`] wraps the whole conversion into a
//! work unit for a [`ConversionQueue`](crate::queue::ConversionQueue).
//!
//! | Source            | Target            | Strategy            |
//! |-------------------|-------------------|---------------------|
//! | png / jpg / webp  | png / jpg / webp  | byte copy           |
//! | png / jpg         | pdf               | image page          |
//! | md                | pdf               | markdown text pages |
//! | txt               | pdf               | text pages          |
//! | md                | txt               | markdown stripping  |

pub mod dispatcher;
pub mod format;
pub mod job;
pub mod strategies;

pub use dispatcher::{Dispatcher, Strategy};
pub use format::FormatKind;
pub use job::{convert_file, output_path_for, submit_conversion};
