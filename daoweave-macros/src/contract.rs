use daoweave_codegen::GenError;
use daoweave_codegen::extract::{classify_methods, dao_type_argument};
use daoweave_codegen::scan::{contract_from_trait, is_marker, parse_output_args};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::{ItemTrait, TraitItem};

pub(crate) fn dao_proxy_impl(args: TokenStream, mut item: ItemTrait) -> syn::Result<TokenStream> {
    let output = parse_output_args(args)?;
    if let Some(output) = &output {
        check_output(output, &item)?;
    }

    let mut contract = contract_from_trait(&item, "crate", "crate")?;
    contract.output = output;
    dao_type_argument(&contract).map_err(|err| to_syn_error(&item, &err))?;
    classify_methods(&contract).map_err(|err| to_syn_error(&item, &err))?;

    for trait_item in &mut item.items {
        let TraitItem::Fn(method) = trait_item else {
            continue;
        };
        let marked = method.attrs.iter().any(is_marker);
        if !marked && method.default.is_none() {
            return Err(syn::Error::new_spanned(
                &method.sig,
                format!(
                    "`{}` needs an #[auto_*] operation marker or a default body",
                    method.sig.ident
                ),
            ));
        }
        method.attrs.retain(|attr| !is_marker(attr));
    }

    Ok(quote!(#item))
}

fn check_output(output: &str, item: &ItemTrait) -> syn::Result<()> {
    let path = syn::parse_str::<syn::Path>(output).ok();
    let rooted = path
        .as_ref()
        .and_then(|path| path.segments.first())
        .is_some_and(|segment| segment.ident == "crate");
    if rooted {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &item.ident,
            format!("output must be a module path starting with `crate`, got `{}`", output),
        ))
    }
}

/// Points errors about a single method at that method's signature.
fn to_syn_error(item: &ItemTrait, err: &GenError) -> syn::Error {
    let method = match err {
        GenError::MethodArity { method, .. }
        | GenError::ConflictingCapability { method, .. }
        | GenError::DuplicateCapability { method, .. } => Some(method.as_str()),
        _ => None,
    };
    let span = method
        .and_then(|name| {
            item.items.iter().find_map(|trait_item| match trait_item {
                TraitItem::Fn(f) if f.sig.ident.unraw() == name => Some(f.sig.to_token_stream()),
                _ => None,
            })
        })
        .unwrap_or_else(|| item.ident.to_token_stream());
    syn::Error::new_spanned(span, err.to_string())
}
