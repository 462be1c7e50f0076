//! Serde attribute extraction.
//!
//! Only the attributes that change the serialized shape are read: `rename`,
//! `rename_all`, `skip`/`skip_serializing` and `flatten`. Everything else in a
//! `#[serde(...)]` list is consumed and ignored.

use syn::meta::ParseNestedMeta;

/// Serde attributes of a container (struct or enum).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SerdeContainer {
    pub rename_all: Option<String>,
}

/// Serde attributes of a field or variant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SerdeField {
    pub rename: Option<String>,
    pub skip: bool,
    pub flatten: bool,
}

impl SerdeContainer {
    pub fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for_each_serde_meta(attrs, |meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(rule) = serialize_value(&meta)? {
                    out.rename_all = Some(rule);
                }
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl SerdeField {
    pub fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for_each_serde_meta(attrs, |meta| {
            if meta.path.is_ident("rename") {
                if let Some(name) = serialize_value(&meta)? {
                    out.rename = Some(name);
                }
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                out.skip = true;
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        })?;
        Ok(out)
    }
}

fn for_each_serde_meta(
    attrs: &[syn::Attribute],
    mut f: impl FnMut(ParseNestedMeta) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if attr.path().is_ident("serde") {
            attr.parse_nested_meta(&mut f)?;
        }
    }
    Ok(())
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: syn::LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// Value of `key = "..."`, or the `serialize` entry of
/// `key(serialize = "...", deserialize = "...")`; the `deserialize` side is
/// ignored.
fn serialize_value(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        return string_value(meta).map(Some);
    }
    let mut out = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            out = Some(string_value(&inner)?);
        } else {
            skip_value(&inner)?;
        }
        Ok(())
    })?;
    Ok(out)
}

/// Consume `= value` or `(...)` after a key we do not interpret
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let _content;
        syn::parenthesized!(_content in meta.input);
    }
    Ok(())
}

/// Extract doc comments from attributes.
/// Returns the lines joined with `\n`, or None without doc comments.
pub fn extract_doc_comment(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value:
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(s),
                        ..
                    }),
                ..
            }) => Some(s.value()),
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').unwrap_or(&line).to_string())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n").trim().to_string())
    }
}

/// Strips the `r#` prefix from raw identifiers.
/// E.g., `r#type` becomes `type`.
pub fn strip_raw_prefix(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

/// Apply a serde `rename_all` rule to a field name. Fields are taken to be
/// written in `snake_case`; unknown rules leave the name as is.
pub fn rename_field(name: &str, rule: Option<&str>) -> String {
    match rule {
        Some("UPPERCASE" | "SCREAMING_SNAKE_CASE") => name.to_ascii_uppercase(),
        Some("PascalCase") => pascal_from_snake(name),
        Some("camelCase") => lower_first(&pascal_from_snake(name)),
        Some("kebab-case") => name.replace('_', "-"),
        Some("SCREAMING-KEBAB-CASE") => name.to_ascii_uppercase().replace('_', "-"),
        _ => name.to_string(),
    }
}

/// Apply a serde `rename_all` rule to a variant name. Variants are taken to
/// be written in `PascalCase`, and every uppercase letter starts a word:
/// `HTTPError` is `h_t_t_p_error` in `snake_case`.
pub fn rename_variant(name: &str, rule: Option<&str>) -> String {
    match rule {
        Some("lowercase") => name.to_ascii_lowercase(),
        Some("UPPERCASE") => name.to_ascii_uppercase(),
        Some("camelCase") => lower_first(name),
        Some("snake_case") => snake_from_pascal(name),
        Some("SCREAMING_SNAKE_CASE") => snake_from_pascal(name).to_ascii_uppercase(),
        Some("kebab-case") => snake_from_pascal(name).replace('_', "-"),
        Some("SCREAMING-KEBAB-CASE") => snake_from_pascal(name)
            .to_ascii_uppercase()
            .replace('_', "-"),
        _ => name.to_string(),
    }
}

fn pascal_from_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut capitalize = true;
    for ch in name.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            out.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn snake_from_pascal(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.char_indices() {
        if i > 0 && ch.is_uppercase() {
            out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
    }
}
