use quote::quote;
use syn::parse::ParseStream;
use syn::spanned::Spanned;

use crate::column;

pub struct ImplTable {
    pub path: syn::Path,
    pub mod_ident: syn::Ident,
    pub column_results: Vec<syn::Result<column::ColumnMethod>>,
}

impl syn::parse::Parse for ImplTable {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let _: syn::token::Impl = input.parse()?;
        let mut path: syn::Path = input.parse()?;

        // `impl Table for Foo { .. }` is accepted as well as `impl Foo { .. }`
        if input.peek(syn::token::For) {
            let _: syn::token::For = input.parse()?;
            path = input.parse()?;
        }

        let content;
        let _brace_token = syn::braced!(content in input);

        let mut column_results = Vec::new();
        while !content.is_empty() {
            column_results.push(
                content
                    .parse::<syn::TraitItemMethod>()
                    .and_then(column::ColumnMethod::try_from),
            );
        }

        let ident = match path.segments.last() {
            Some(segment) => &segment.ident,
            None => return Err(syn::Error::new(path.span(), "Expected a table type")),
        };
        let ident_lower = ident.to_string().to_lowercase();
        let mod_ident = quote::format_ident!("__{}", ident_lower);

        Ok(ImplTable {
            path,
            mod_ident,
            column_results,
        })
    }
}

pub fn gen_table(table_name: syn::LitStr, impl_table: ImplTable) -> proc_macro2::TokenStream {
    let path = &impl_table.path;
    let mod_ident = &impl_table.mod_ident;

    let columns: Vec<_> = impl_table
        .column_results
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .collect();
    let column_count = columns.len();

    let errors = impl_table
        .column_results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .map(|err| err.to_compile_error());

    let column_refs = columns.iter().map(|column| {
        let column_name = &column.column_name;
        let ty = &column.ty;

        quote! {
            ::qcompose::column::ColumnRef {
                table: #table_name,
                name: #column_name,
                kind: <#ty as ::qcompose::ty::ColumnType>::KIND,
                nullable: <#ty as ::qcompose::ty::ColumnType>::NULLABLE,
            }
        }
    });

    let column_methods = columns.iter().enumerate().map(|(idx, column)| {
        let method_ident = &column.method_ident;
        let ty = &column.ty;
        let doc = format!(
            "The `{}.{}` column.",
            table_name.value(),
            column.column_name.value()
        );

        quote! {
            #[doc = #doc]
            pub fn #method_ident() -> ::qcompose::column::Column<#path, #ty> {
                ::qcompose::column::Column::from_ref(#mod_ident::COLUMNS[#idx])
            }
        }
    });

    quote! {
        #(#errors)*

        impl ::qcompose::Table for #path {
            fn name(&self) -> &'static str {
                #table_name
            }

            fn columns(&self) -> &'static [::qcompose::column::ColumnRef] {
                &#mod_ident::COLUMNS
            }
        }

        impl #path {
            #(#column_methods)*
        }

        #[doc(hidden)]
        #[allow(non_snake_case)]
        mod #mod_ident {
            use super::*;

            static INSTANCE: #path = #path;

            pub(super) static COLUMNS: [::qcompose::column::ColumnRef; #column_count] = [
                #(#column_refs),*
            ];

            impl ::qcompose::Instance for #path {
                fn instance() -> &'static Self {
                    &INSTANCE
                }
            }
        }
    }
}
