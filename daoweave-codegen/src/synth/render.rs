use daoweave_core::Operation;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;

use super::plan::{Assignment, Condition, StatementPlan, ValueExpr};

/// Parameter names of a generated function, by operation.
pub(crate) fn param_names(operation: Operation) -> &'static [&'static str] {
    match operation {
        Operation::Update => &["set", "con"],
        _ => &["var"],
    }
}

/// Identifier for a field or method name; keywords come out raw (`r#type`).
pub(crate) fn ident(name: &str) -> Ident {
    if syn::parse_str::<Ident>(name).is_ok() {
        Ident::new(name, Span::call_site())
    } else {
        Ident::new_raw(name, Span::call_site())
    }
}

/// `::daoweave::Operation::<Variant>`
pub(crate) fn operation_tokens(operation: Operation) -> TokenStream {
    let variant = ident(match operation {
        Operation::Insert => "Insert",
        Operation::Delete => "Delete",
        Operation::Update => "Update",
        Operation::Select => "Select",
        Operation::SelectOne => "SelectOne",
    });
    quote!(::daoweave::Operation::#variant)
}

/// One provider function assembling the plan's statement.
pub(crate) fn provider_fn(plan: &StatementPlan, entity: &TokenStream, provider: &str) -> TokenStream {
    let name = ident(&plan.method);
    let params = param_names(plan.operation);
    // UPDATE writes from the first parameter and filters on the last
    let assign_src = ident(params[0]);
    let cond_src = ident(params[params.len() - 1]);
    let args = params.iter().map(|param| {
        let param = ident(param);
        quote!(#param: &#entity)
    });
    let operation = operation_tokens(plan.operation);
    let table = &plan.table;
    let assignments = plan
        .assignments
        .iter()
        .map(|assignment| assignment_tokens(assignment, &assign_src));
    let conditions = plan
        .conditions
        .iter()
        .map(|condition| condition_tokens(condition, &cond_src));
    let order = plan.order_by.iter().map(|term| {
        let column = &term.column;
        let descending = term.descending;
        quote!(sql.order_by(#column, #descending);)
    });
    let target = format!("{}::{}", provider, plan.method);

    quote! {
        #[allow(unused_variables, unused_mut)]
        pub fn #name(#(#args),*) -> ::daoweave::DaoResult<::daoweave::Statement> {
            let mut sql = ::daoweave::SqlBuilder::new(#operation, #table);
            #(#assignments)*
            #(#conditions)*
            #(#order)*
            let statement = sql.build()?;
            ::daoweave::tracing::debug!(provider = #target, sql = %statement, "assembled statement");
            Ok(statement)
        }
    }
}

fn assignment_tokens(assignment: &Assignment, source: &Ident) -> TokenStream {
    let column = &assignment.column;
    let template = assignment.value.template();
    match &assignment.value {
        ValueExpr::Sequence(_) => quote!(sql.value_raw(#column, #template);),
        ValueExpr::Param | ValueExpr::Converted { .. } => {
            let field = ident(&assignment.field);
            quote! {
                if let Some(value) = ::daoweave::FieldValue::present(&#source.#field) {
                    sql.value_param(#column, #template, value);
                }
            }
        }
    }
}

fn condition_tokens(condition: &Condition, source: &Ident) -> TokenStream {
    match condition {
        Condition::Raw { predicate, .. } => quote!(sql.where_raw(#predicate);),
        Condition::Like {
            column,
            field,
            operator,
        } => {
            let field = ident(field);
            quote!(sql.where_like(#column, #operator, ::daoweave::FieldValue::to_sql(&#source.#field));)
        }
        Condition::Compare {
            column,
            field,
            operator,
        } => {
            let field = ident(field);
            quote!(sql.where_param(#column, #operator, "?", ::daoweave::FieldValue::to_sql(&#source.#field));)
        }
        Condition::Equals {
            column,
            field,
            value,
        } => {
            let field = ident(field);
            let template = value.template();
            quote! {
                if let Some(value) = ::daoweave::FieldValue::present(&#source.#field) {
                    sql.where_param(#column, "=", #template, value);
                }
            }
        }
    }
}
