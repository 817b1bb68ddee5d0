pub fn attr_has_simple_ident(attr: &syn::Attribute, name: &str) -> bool {
    let path = &attr.path;
    if path.leading_colon.is_some() || path.segments.len() != 1 {
        return false;
    }

    match path.segments.last() {
        Some(segment) => segment.ident == name,
        None => false,
    }
}

/// Parse the `("...")` part of `#[ident("...")]`.
pub fn parse_paren_lit_str(attr: &syn::Attribute) -> syn::Result<syn::LitStr> {
    attr.parse_args::<syn::LitStr>()
}
