use daoweave_codegen::model::EntityDescriptor;
use daoweave_codegen::naming::column_name;
use daoweave_codegen::scan::entity_from_struct;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, ItemStruct};

pub(crate) fn derive_entity_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "daoweave Entity only supports structs",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "daoweave Entity does not support generic structs",
        ));
    }

    let item = ItemStruct {
        attrs: input.attrs.clone(),
        vis: input.vis.clone(),
        struct_token: data.struct_token,
        ident: input.ident.clone(),
        generics: input.generics.clone(),
        fields: data.fields.clone(),
        semi_token: data.semi_token,
    };
    // The module path only matters to the generator.
    let descriptor = entity_from_struct(&item, "crate")?;

    let Some(table) = descriptor
        .table
        .as_deref()
        .map(str::trim)
        .filter(|table| !table.is_empty())
    else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("entity `{}` has no #[table(..)] marker", input.ident),
        ));
    };

    let columns = descriptor
        .fields
        .iter()
        .map(|field| column_name(&field.name, descriptor.no_case_conversion));
    let name = &input.ident;
    let from_row = from_row_impl(name, &data.fields, &descriptor);

    Ok(quote! {
        impl ::daoweave::Entity for #name {
            const TABLE: &'static str = #table;
            const COLUMNS: &'static [&'static str] = &[#(#columns),*];
        }

        #from_row
    })
}

/// `FromRow` reading every mapped field from its derived column. Ignored and
/// unsupported fields take their `Default`.
fn from_row_impl(
    name: &syn::Ident,
    fields: &Fields,
    descriptor: &EntityDescriptor,
) -> proc_macro2::TokenStream {
    let mut bounds = Vec::new();
    let mut inits = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let mapped = descriptor
            .fields
            .iter()
            .find(|mapped| ident.unraw() == mapped.name);
        match mapped {
            Some(mapped) => {
                let ty = &field.ty;
                let column = column_name(&mapped.name, descriptor.no_case_conversion);
                bounds.push(quote! {
                    #ty: ::daoweave::sqlx::Decode<'r, <R as ::daoweave::sqlx::Row>::Database>
                        + ::daoweave::sqlx::Type<<R as ::daoweave::sqlx::Row>::Database>
                });
                inits.push(quote! {
                    #ident: ::daoweave::sqlx::Row::try_get(row, ::daoweave::column_index(row, #column)?)?
                });
            }
            None => inits.push(quote!(#ident: ::core::default::Default::default())),
        }
    }

    quote! {
        impl<'r, R> ::daoweave::sqlx::FromRow<'r, R> for #name
        where
            R: ::daoweave::sqlx::Row,
            usize: ::daoweave::sqlx::ColumnIndex<R>,
            #(#bounds,)*
        {
            fn from_row(row: &'r R) -> ::core::result::Result<Self, ::daoweave::sqlx::Error> {
                ::core::result::Result::Ok(Self {
                    #(#inits,)*
                })
            }
        }
    }
}
