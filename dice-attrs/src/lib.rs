mod error_kind;

use error_kind::ErrorKindTarget;
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the [`ErrorKind`] trait for a struct describing one kind of error.
///
/// The report is described by the `error` attribute:
/// ```
/// use dice_attrs::ErrorKind;
///
/// #[derive(Debug, ErrorKind)]
/// #[error(message = "unexpected end of file", labels = ["add something here"])]
/// pub struct Foo;
/// ```
///
/// | Tag       | Required | Description                                                      |
/// | --------- | -------- | ---------------------------------------------------------------- |
/// | `message` | yes      | The message at the top of the report.                            |
/// | `labels`  | yes      | Anything iterable of label texts; label `i` points at span `i`.  |
/// | `help`    | no       | What the user can do about the error.                            |
/// | `color`   | no       | The [`ariadne::Color`] of the labels (default `dice_error::EXPR`). |
///
/// Texts may be any expression whose value implements [`ToString`]. The expressions are
/// evaluated inside the generated method, so the fields are available through `self`:
/// ```
/// use dice_attrs::ErrorKind;
///
/// #[derive(Debug, ErrorKind)]
/// #[error(
///     message = format!("{} dice are missing", self.count),
///     labels = vec!["missing"; self.count],
///     color = dice_error::DICE,
/// )]
/// pub struct Missing {
///     count: usize,
/// }
/// ```
///
/// The generated implementation refers to `dice_error` and `ariadne` by absolute path, so both
/// must be dependencies of the crate using the derive.
///
/// [`ErrorKind`]: https://docs.rs/dice-error
#[proc_macro_derive(ErrorKind, attributes(error))]
pub fn error_kind(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    ErrorKindTarget::from_input(input)
        .map(|target| target.expand())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
