use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Generics, Ident, Result};

/// The tags of an `#[error(...)]` attribute.
#[derive(Default)]
struct Tags {
    message: Option<Expr>,
    labels: Option<Expr>,
    help: Option<Expr>,
    color: Option<Expr>,
}

impl Tags {
    /// Reads the tags from the attribute. Each tag may appear at most once.
    fn parse(attr: &Attribute) -> Result<Self> {
        let mut tags = Self::default();
        attr.parse_nested_meta(|meta| {
            let slot = if meta.path.is_ident("message") {
                &mut tags.message
            } else if meta.path.is_ident("labels") {
                &mut tags.labels
            } else if meta.path.is_ident("help") {
                &mut tags.help
            } else if meta.path.is_ident("color") {
                &mut tags.color
            } else {
                return Err(meta.error("unknown tag, expected `message`, `labels`, `help` or `color`"));
            };

            if slot.is_some() {
                return Err(meta.error("this tag was already given"));
            }
            *slot = Some(meta.value()?.parse()?);
            Ok(())
        })?;
        Ok(tags)
    }
}

/// A struct deriving `ErrorKind`, with everything needed to expand the derive.
pub struct ErrorKindTarget {
    name: Ident,
    generics: Generics,
    message: Expr,
    labels: Expr,
    help: Option<Expr>,
    color: Option<Expr>,
}

impl ErrorKindTarget {
    /// Checks the derive input and reads its `error` attribute.
    pub fn from_input(input: DeriveInput) -> Result<Self> {
        if !matches!(input.data, Data::Struct(_)) {
            return Err(syn::Error::new_spanned(&input.ident, "`ErrorKind` can only be derived for structs"));
        }

        let attr = input.attrs
            .iter()
            .find(|attr| attr.path().is_ident("error"))
            .ok_or_else(|| syn::Error::new_spanned(&input.ident, "missing `#[error(...)]` attribute"))?;
        let tags = Tags::parse(attr)?;
        let missing = |tag| syn::Error::new_spanned(attr, format!("missing `{}` tag", tag));

        Ok(Self {
            message: tags.message.ok_or_else(|| missing("message"))?,
            labels: tags.labels.ok_or_else(|| missing("labels"))?,
            help: tags.help,
            color: tags.color,
            name: input.ident,
            generics: input.generics,
        })
    }

    /// Generates the `ErrorKind` implementation.
    pub fn expand(&self) -> TokenStream2 {
        let Self { name, message, labels, .. } = self;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();
        let color = self.color
            .as_ref()
            .map_or_else(|| quote! { ::dice_error::EXPR }, |color| quote! { #color });
        let help = self.help.as_ref().map(|help| quote! { report.set_help(#help); });

        quote! {
            impl #impl_generics ::dice_error::ErrorKind for #name #ty_generics #where_clause {
                fn build_report<'a>(
                    &self,
                    src_id: &'a str,
                    spans: &[::std::ops::Range<usize>],
                ) -> ::ariadne::Report<(&'a str, ::std::ops::Range<usize>)> {
                    let color = #color;

                    // the i-th label points at the i-th span; extra labels reuse the last span
                    let labels = ::std::iter::IntoIterator::into_iter(#labels)
                        .enumerate()
                        .map(|(i, text)| {
                            let span = spans.get(i).or(spans.last()).cloned().unwrap_or(0..0);
                            let text = ::std::string::ToString::to_string(&text);
                            let label = ::ariadne::Label::new((src_id, span)).with_color(color);
                            if text.is_empty() {
                                label
                            } else {
                                label.with_message(text)
                            }
                        })
                        .collect::<::std::vec::Vec<_>>();

                    let start = spans.first().map_or(0, |span| span.start);
                    #[allow(unused_mut)]
                    let mut report = ::ariadne::Report::build(::ariadne::ReportKind::Error, src_id, start)
                        .with_message(#message)
                        .with_labels(labels);
                    #help
                    report.finish()
                }
            }
        }
    }
}
