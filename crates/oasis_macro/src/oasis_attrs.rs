//! `#[oasis(...)]` attribute parsing.

use syn::meta::ParseNestedMeta;

/// Container options.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContainerAttrs {
    /// Registry name override
    pub name: Option<String>,
    /// Use the type's `SchemaDoc` impl instead of inferring
    pub schema_doc: bool,
}

/// Field options. Constraint values are kept as text; they are checked
/// against the field's schema type when the schema is inferred.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldAttrs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub r#enum: Option<String>,
    pub default: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub required: bool,
    pub inline: bool,
    pub skip: bool,
    /// Raw `k=v;k=v` tag
    pub doc: Option<String>,
    /// Raw `required,min=..` tag
    pub validate: Option<String>,
}

impl FieldAttrs {
    /// Whether any explicit constraint is set
    pub fn has_constraints(&self) -> bool {
        self.required
            || self.description.is_some()
            || self.format.is_some()
            || self.pattern.is_some()
            || self.r#enum.is_some()
            || self.default.is_some()
            || self.min.is_some()
            || self.max.is_some()
    }
}

impl ContainerAttrs {
    pub fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("oasis")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    out.name = Some(lit_text(&meta)?);
                } else if meta.path.is_ident("schema_doc") {
                    out.schema_doc = true;
                } else {
                    return Err(meta.error("unknown oasis container attribute"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

impl FieldAttrs {
    pub fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("oasis")) {
            attr.parse_nested_meta(|meta| {
                let Some(key) = meta.path.get_ident().map(ToString::to_string) else {
                    return Err(meta.error("expected a single identifier"));
                };
                match key.as_str() {
                    "required" => out.required = true,
                    "inline" => out.inline = true,
                    "skip" => out.skip = true,
                    "name" => out.name = Some(lit_text(&meta)?),
                    "description" => out.description = Some(lit_text(&meta)?),
                    "format" => out.format = Some(lit_text(&meta)?),
                    "pattern" => out.pattern = Some(lit_text(&meta)?),
                    "enum" => out.r#enum = Some(lit_text(&meta)?),
                    "default" => out.default = Some(lit_text(&meta)?),
                    "min" => out.min = Some(lit_text(&meta)?),
                    "max" => out.max = Some(lit_text(&meta)?),
                    "doc" => out.doc = Some(lit_text(&meta)?),
                    "validate" => out.validate = Some(lit_text(&meta)?),
                    _ => return Err(meta.error(format!("unknown oasis field attribute `{key}`"))),
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// Text of a literal value: strings verbatim, numbers and booleans as written
/// (including a leading minus sign).
fn lit_text(meta: &ParseNestedMeta) -> syn::Result<String> {
    let expr: syn::Expr = meta.value()?.parse()?;
    expr_text(&expr)
}

fn expr_text(expr: &syn::Expr) -> syn::Result<String> {
    match expr {
        syn::Expr::Lit(syn::ExprLit { lit, .. }) => match lit {
            syn::Lit::Str(s) => Ok(s.value()),
            syn::Lit::Int(i) => Ok(i.base10_digits().to_string()),
            syn::Lit::Float(f) => Ok(f.base10_digits().to_string()),
            syn::Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(syn::Error::new_spanned(other, "unsupported literal")),
        },
        syn::Expr::Unary(syn::ExprUnary {
            op: syn::UnOp::Neg(_),
            expr,
            ..
        }) => Ok(format!("-{}", expr_text(expr)?)),
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string, number or boolean literal",
        )),
    }
}
