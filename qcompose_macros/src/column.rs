use syn::spanned::Spanned;

use crate::attr::attr_util;

/// One `fn name() -> Ty;` line inside a table declaration.
pub struct ColumnMethod {
    pub method_ident: syn::Ident,
    pub column_name: syn::LitStr,
    pub ty: syn::Type,
}

impl ColumnMethod {
    pub fn try_from(method: syn::TraitItemMethod) -> syn::Result<Self> {
        let span = method.span();

        if let Some(block) = &method.default {
            return Err(syn::Error::new(
                block.span(),
                "Column declarations must not have a body",
            ));
        }

        if let Some(input) = method.sig.inputs.first() {
            return Err(syn::Error::new(
                input.span(),
                "Column declarations take no arguments",
            ));
        }

        let ty = match &method.sig.output {
            syn::ReturnType::Default => return Err(syn::Error::new(span, "Expected return type")),
            syn::ReturnType::Type(_, ty) => (**ty).clone(),
        };

        let method_ident = method.sig.ident;
        let column_name = column_name_from_attrs(&method.attrs)?
            .unwrap_or_else(|| syn::LitStr::new(&method_ident.to_string(), method_ident.span()));

        Ok(Self {
            method_ident,
            column_name,
            ty,
        })
    }
}

fn column_name_from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Option<syn::LitStr>> {
    let mut column_name = None;

    for attr in attrs {
        if attr_util::attr_has_simple_ident(attr, "column") {
            column_name = Some(attr_util::parse_paren_lit_str(attr)?);
        } else if attr_util::attr_has_simple_ident(attr, "doc") {
            continue;
        } else {
            return Err(syn::Error::new(attr.span(), "Unrecognized attribute"));
        }
    }

    Ok(column_name)
}
