//! `#[derive(Describe)]` code generation.
//!
//! - Structs with named fields become `Shape::Struct`, one field descriptor
//!   per field, honoring serde renames, `skip` and `flatten`.
//! - Newtype structs describe as their inner type but keep their own name.
//! - Enums whose variants are all unit variants become a string schema with
//!   the serialized variant names as `enum` values.
//! - `#[oasis(schema_doc)]` delegates to the type's `SchemaDoc` impl.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DeriveInput, Fields, FieldsNamed};

use crate::oasis_attrs::{ContainerAttrs, FieldAttrs};
use crate::serde_attrs::{
    SerdeContainer, SerdeField, extract_doc_comment, rename_field, rename_variant, strip_raw_prefix,
};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let container = ContainerAttrs::from_attrs(&input.attrs)?;
    let serde = SerdeContainer::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let name = type_name(input, &container);

    let body = if container.schema_doc {
        quote! {
            ::oasis::describe::TypeDescriptor::named(
                ::core::module_path!(),
                #name,
                ::oasis::describe::Shape::SelfDescribed(
                    <Self as ::oasis::describe::SchemaDoc>::schema_doc(),
                ),
            )
        }
    } else {
        match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(fields) => struct_body(fields, &serde, &name)?,
                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                    newtype_body(&fields.unnamed[0].ty, &name)
                }
                _ => {
                    return Err(syn::Error::new_spanned(
                        ident,
                        "Describe can only be derived for structs with named fields or newtype structs; \
                         implement SchemaDoc and add #[oasis(schema_doc)] instead",
                    ));
                }
            },
            Data::Enum(data) => enum_body(ident, data, &serde, &name)?,
            Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "Describe cannot be derived for unions",
                ));
            }
        }
    };

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(syn::parse_quote!(::oasis::describe::Describe));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::oasis::describe::Describe for #ident #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn describe<'__oasis>(
                sample: ::core::option::Option<&'__oasis Self>,
            ) -> ::oasis::describe::TypeDescriptor<'__oasis> {
                #body
            }
        }
    })
}

/// Identifier used in the registry key; generic arguments are rendered from
/// their own keys, e.g. `Page[array.models.Book]`.
fn type_name(input: &DeriveInput, container: &ContainerAttrs) -> TokenStream {
    let base = container
        .name
        .clone()
        .unwrap_or_else(|| strip_raw_prefix(&input.ident.to_string()).to_string());
    let params: Vec<_> = input.generics.type_params().map(|p| &p.ident).collect();
    if params.is_empty() {
        quote!(#base)
    } else {
        quote! {
            ::std::format!(
                "{}[{}]",
                #base,
                [#(::oasis::engine::key_of::<#params>()),*].join(","),
            )
        }
    }
}

fn struct_body(
    fields: &FieldsNamed,
    serde: &SerdeContainer,
    name: &TokenStream,
) -> syn::Result<TokenStream> {
    let mut descriptors = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let serde_field = SerdeField::from_attrs(&field.attrs)?;
        let attrs = FieldAttrs::from_attrs(&field.attrs)?;

        let rust_name = field_ident.to_string();
        let prop_name = attrs
            .name
            .clone()
            .or_else(|| serde_field.rename.clone())
            .unwrap_or_else(|| {
                rename_field(strip_raw_prefix(&rust_name), serde.rename_all.as_deref())
            });

        if serde_field.skip || attrs.skip {
            descriptors.push(quote! {
                ::oasis::describe::FieldDescriptor::new(
                    #prop_name,
                    ::oasis::describe::Nested::opaque(),
                )
                .omitted()
            });
            continue;
        }

        let ty = &field.ty;
        let mut descriptor = quote! {
            ::oasis::describe::FieldDescriptor::new(
                #prop_name,
                ::oasis::describe::Nested::of::<#ty>(sample.map(|s| &s.#field_ident)),
            )
        };
        if let Some(tags) = field_tags(&attrs, extract_doc_comment(&field.attrs)) {
            descriptor.extend(quote!(.with_tags(#tags)));
        }
        if let Some(doc) = &attrs.doc {
            descriptor.extend(quote!(.with_doc_tag(#doc)));
        }
        if let Some(validate) = &attrs.validate {
            descriptor.extend(quote!(.with_validate_tag(#validate)));
        }
        if serde_field.flatten || attrs.inline {
            descriptor.extend(quote!(.inline()));
        }
        descriptors.push(descriptor);
    }

    Ok(quote! {
        ::oasis::describe::TypeDescriptor::named(
            ::core::module_path!(),
            #name,
            ::oasis::describe::Shape::Struct(::std::vec![#(#descriptors),*]),
        )
    })
}

/// `FieldTags` builder chain, or None when the field has no constraints.
/// A doc comment is the description unless one is given explicitly.
fn field_tags(attrs: &FieldAttrs, doc_comment: Option<String>) -> Option<TokenStream> {
    let description = attrs.description.clone().or(doc_comment);
    if !attrs.has_constraints() && description.is_none() {
        return None;
    }
    let mut tags = quote!(::oasis::tags::FieldTags::default());
    let setters = [
        ("with_description", description.as_ref()),
        ("with_format", attrs.format.as_ref()),
        ("with_pattern", attrs.pattern.as_ref()),
        ("with_enum", attrs.r#enum.as_ref()),
        ("with_default", attrs.default.as_ref()),
        ("with_min", attrs.min.as_ref()),
        ("with_max", attrs.max.as_ref()),
    ];
    for (setter, value) in setters {
        if let Some(value) = value {
            let setter = syn::Ident::new(setter, proc_macro2::Span::call_site());
            tags.extend(quote!(.#setter(#value)));
        }
    }
    if attrs.required {
        tags.extend(quote!(.with_required(true)));
    }
    Some(tags)
}

fn newtype_body(inner: &syn::Type, name: &TokenStream) -> TokenStream {
    quote! {
        let mut descriptor =
            <#inner as ::oasis::describe::Describe>::describe(sample.map(|s| &s.0));
        descriptor.name = ::core::option::Option::Some(::oasis::describe::TypeName {
            module_path: ::core::module_path!(),
            ident: ::core::convert::Into::into(#name),
        });
        descriptor
    }
}

fn enum_body(
    ident: &syn::Ident,
    data: &DataEnum,
    serde: &SerdeContainer,
    name: &TokenStream,
) -> syn::Result<TokenStream> {
    let mut values = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Describe can only be derived for enums with unit variants; \
                 implement SchemaDoc and add #[oasis(schema_doc)] instead",
            ));
        }
        let serde_variant = SerdeField::from_attrs(&variant.attrs)?;
        if serde_variant.skip {
            continue;
        }
        values.push(serde_variant.rename.unwrap_or_else(|| {
            rename_variant(&variant.ident.to_string(), serde.rename_all.as_deref())
        }));
    }
    if values.is_empty() {
        return Err(syn::Error::new_spanned(
            ident,
            "Describe needs at least one serialized variant",
        ));
    }

    Ok(quote! {
        ::oasis::describe::TypeDescriptor::named(
            ::core::module_path!(),
            #name,
            ::oasis::describe::Shape::SelfDescribed(::oasis::schema::Schema {
                r#enum: ::core::option::Option::Some(::std::vec![
                    #(::oasis::serde_json::Value::from(#values)),*
                ]),
                ..::oasis::schema::Schema::string()
            }),
        )
    })
}
