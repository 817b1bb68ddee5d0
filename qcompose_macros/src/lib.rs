#![forbid(unsafe_code)]

extern crate proc_macro;

mod column;
mod table;

mod attr {
    pub mod attr_util;
}

use proc_macro::TokenStream;

///
/// Declare a database table.
///
/// ```ignore
/// pub struct Member;
///
/// #[qcompose::table("member")]
/// impl Member {
///     fn id() -> i64;
///     #[column("username")]
///     fn name() -> Option<String>;
/// }
/// ```
///
/// Every bodiless associated function becomes a typed column accessor,
/// returning `qcompose::column::Column<Self, T>`.
///
#[proc_macro_attribute]
pub fn table(args: TokenStream, input: TokenStream) -> TokenStream {
    let name: syn::LitStr = syn::parse_macro_input!(args as syn::LitStr);
    let impl_table = syn::parse_macro_input!(input as table::ImplTable);

    let tokens = table::gen_table(name, impl_table);

    TokenStream::from(tokens)
}
