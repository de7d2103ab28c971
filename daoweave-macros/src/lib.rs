use proc_macro::TokenStream;
use syn::{DeriveInput, ItemTrait, parse_macro_input};

mod contract;
mod entity;

/// Implements `daoweave::Entity` from the struct's `#[table(..)]` marker and
/// its mapped fields.
#[proc_macro_derive(Entity, attributes(table, non_camel_case, id, sql_date, dao))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match entity::derive_entity_impl(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

/// Marks a trait as a data-access contract.
///
/// The trait is re-emitted without its `#[auto_*]` operation markers after
/// they have been checked; `daoweave generate` produces the implementation.
#[proc_macro_attribute]
pub fn dao_proxy(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemTrait);
    match contract::dao_proxy_impl(args.into(), item) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}
