mod describe_impl;
mod oasis_attrs;
mod serde_attrs;

use proc_macro::TokenStream;

/// Derive macro for `Describe`
///
/// Field options go in `#[oasis(...)]`: `required`, `min`, `max`, `pattern`,
/// `enum = "a|b"`, `default`, `format`, `description`, `name`, `inline`,
/// `skip`, plus the textual forms `doc = "k=v;k=v"` and
/// `validate = "required,max=128"`. Doc comments become descriptions. On the
/// type, `#[oasis(schema_doc)]` uses its `SchemaDoc` impl and
/// `#[oasis(name = "...")]` overrides the registry name.
#[proc_macro_derive(Describe, attributes(oasis))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    describe_impl::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
