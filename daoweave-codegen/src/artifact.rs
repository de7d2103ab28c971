//! Assembly of the three generated artifacts of a contract.

use daoweave_core::Operation;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use serde::Serialize;

use crate::error::GenError;
use crate::model::{ClassifiedMethod, ContractDescriptor, EntityDescriptor, base_methods};
use crate::naming::to_snake_case;
use crate::synth::render::{ident, operation_tokens, param_names, provider_fn};
use crate::synth::{StatementPlan, plan_methods};

/// Module, below the contract's package, receiving the Impl artifact.
pub const IMPL_MODULE: &str = "proxy";
/// Module, below the output module, receiving the Provider artifact.
pub const PROVIDER_MODULE: &str = "provider";

const HEADER: &str = "// @generated by daoweave. Do not edit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactRole {
    Impl,
    Mapper,
    Provider,
}

impl ArtifactRole {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Impl => "Impl",
            Self::Mapper => "Mapper",
            Self::Provider => "Provider",
        }
    }

    /// `<Entity>Proxy{Impl|Mapper|Provider}`
    pub fn type_name(self, entity: &str) -> String {
        format!("{}Proxy{}", entity, self.suffix())
    }
}

/// One generated compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub role: ArtifactRole,
    pub type_name: String,
    /// Module holding the artifact's file, e.g. `crate::mapper::provider`.
    pub module_path: String,
    pub source: String,
}

impl GeneratedArtifact {
    /// File stem and module name of the artifact.
    pub fn module_name(&self) -> String {
        to_snake_case(&self.type_name)
    }

    /// `crate::mapper::movie_proxy_mapper::MovieProxyMapper`
    pub fn type_path(&self) -> String {
        format!("{}::{}::{}", self.module_path, self.module_name(), self.type_name)
    }
}

/// Artifacts of one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub provider: GeneratedArtifact,
    pub mapper: GeneratedArtifact,
    pub implementation: GeneratedArtifact,
}

impl ArtifactSet {
    /// Submission order: Provider, Mapper, Impl.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        [&self.provider, &self.mapper, &self.implementation].into_iter()
    }
}

fn parse_path(path: &str) -> Result<TokenStream, GenError> {
    let parsed = syn::parse_str::<syn::Path>(path).map_err(|_| GenError::InvalidPath(path.to_owned()))?;
    Ok(quote!(#parsed))
}

fn render_source(type_name: &str, items: &[TokenStream]) -> Result<String, GenError> {
    let file = syn::parse2::<syn::File>(quote!(#(#items)*)).map_err(|err| GenError::Compile {
        type_name: type_name.to_owned(),
        message: err.to_string(),
    })?;
    Ok(format!("{}\n\n{}", HEADER, prettyplease::unparse(&file)))
}

/// Return type of a method, by operation.
fn output_type(operation: Operation, entity: &TokenStream) -> TokenStream {
    match operation {
        Operation::Insert | Operation::Delete | Operation::Update => quote!(u64),
        Operation::Select => quote!(::std::vec::Vec<#entity>),
        Operation::SelectOne => quote!(::core::option::Option<#entity>),
    }
}

fn params(operation: Operation, entity: &TokenStream) -> (Vec<TokenStream>, Vec<Ident>) {
    let names = param_names(operation)
        .iter()
        .map(|name| ident(name))
        .collect::<Vec<_>>();
    let args = names.iter().map(|name| quote!(#name: &#entity)).collect();
    (args, names)
}

/// Plans and assembles the Provider, Mapper and Impl artifacts of a contract.
pub fn synthesize(
    contract: &ContractDescriptor,
    entity: &EntityDescriptor,
    methods: &[ClassifiedMethod],
    output: &str,
) -> Result<ArtifactSet, GenError> {
    let plans = plan_methods(entity, methods)?;
    let entity_path = parse_path(&entity.type_path())?;

    let provider = provider_artifact(entity, &plans, &entity_path, output)?;
    let mapper = mapper_artifact(entity, &plans, &entity_path, output, &provider)?;
    let implementation = impl_artifact(contract, entity, &plans, &entity_path, &mapper)?;

    tracing::debug!(
        contract = %contract.name,
        entity = %entity.name,
        methods = plans.len(),
        "synthesized artifacts"
    );
    Ok(ArtifactSet {
        provider,
        mapper,
        implementation,
    })
}

fn provider_artifact(
    entity: &EntityDescriptor,
    plans: &[StatementPlan],
    entity_path: &TokenStream,
    output: &str,
) -> Result<GeneratedArtifact, GenError> {
    let type_name = ArtifactRole::Provider.type_name(&entity.name);
    let name = ident(&type_name);
    let functions = plans
        .iter()
        .map(|plan| provider_fn(plan, entity_path, &type_name));

    let doc = format!(" Statement-assembly functions for `{}`.", entity.name);

    let items = [
        quote! {
            #[doc = #doc]
            pub struct #name;
        },
        quote! {
            impl #name {
                #(#functions)*
            }
        },
    ];

    Ok(GeneratedArtifact {
        role: ArtifactRole::Provider,
        source: render_source(&type_name, &items)?,
        type_name,
        module_path: format!("{}::{}", output, PROVIDER_MODULE),
    })
}

fn mapper_artifact(
    entity: &EntityDescriptor,
    plans: &[StatementPlan],
    entity_path: &TokenStream,
    output: &str,
    provider: &GeneratedArtifact,
) -> Result<GeneratedArtifact, GenError> {
    let type_name = ArtifactRole::Mapper.type_name(&entity.name);
    let name = ident(&type_name);
    let provider_path = parse_path(&provider.type_path())?;

    let bindings = plans.iter().map(|plan| {
        let method = &plan.method;
        let target = format!("{}::{}", provider.type_name, plan.method);
        let operation = operation_tokens(plan.operation);
        quote! {
            ::daoweave::MapperBinding {
                method: #method,
                provider: #target,
                operation: #operation,
            }
        }
    });

    let accessors = plans.iter().map(|plan| {
        let method = ident(&plan.method);
        let (args, names) = params(plan.operation, entity_path);
        let output = output_type(plan.operation, entity_path);
        let call = ident(match plan.operation {
            Operation::Insert | Operation::Delete | Operation::Update => "execute",
            Operation::Select => "fetch_all",
            Operation::SelectOne => "fetch_optional",
        });
        quote! {
            pub async fn #method(&self, #(#args),*) -> ::daoweave::DaoResult<#output> {
                let statement = #provider_path::#method(#(#names),*)?;
                self.session.#call(statement).await
            }
        }
    });

    let doc = format!(" Runs `{}` statements through a session.", entity.name);

    let items = [
        quote! {
            #[doc = #doc]
            pub struct #name<S> {
                session: S,
            }
        },
        quote! {
            impl<S> #name<S>
            where
                S: ::daoweave::SqlSession,
                #entity_path: for<'r> ::daoweave::sqlx::FromRow<'r, ::daoweave::SessionRow<S>> + Send + Unpin,
            {
                pub const BINDINGS: &'static [::daoweave::MapperBinding] = &[#(#bindings),*];

                pub fn new(session: S) -> Self {
                    Self { session }
                }

                pub fn session(&self) -> &S {
                    &self.session
                }

                #(#accessors)*
            }
        },
    ];

    Ok(GeneratedArtifact {
        role: ArtifactRole::Mapper,
        source: render_source(&type_name, &items)?,
        type_name,
        module_path: output.to_owned(),
    })
}

fn impl_artifact(
    contract: &ContractDescriptor,
    entity: &EntityDescriptor,
    plans: &[StatementPlan],
    entity_path: &TokenStream,
    mapper: &GeneratedArtifact,
) -> Result<GeneratedArtifact, GenError> {
    let type_name = ArtifactRole::Impl.type_name(&entity.name);
    let name = ident(&type_name);
    let mapper_path = parse_path(&mapper.type_path())?;
    let contract_path = parse_path(&contract.type_path())?;
    let base = base_methods();

    let forward = |plan: &StatementPlan| {
        let method = ident(&plan.method);
        let (args, names) = params(plan.operation, entity_path);
        let output = output_type(plan.operation, entity_path);
        quote! {
            fn #method(&self, #(#args),*)
                -> impl ::core::future::Future<Output = ::daoweave::DaoResult<#output>> + Send
            {
                self.mapper.#method(#(#names),*)
            }
        }
    };
    let (base_plans, declared_plans): (Vec<&StatementPlan>, Vec<&StatementPlan>) = plans
        .iter()
        .partition(|plan| base.iter().any(|method| method.name == plan.method));
    let base_methods = base_plans.into_iter().map(forward);
    let declared_methods = declared_plans.into_iter().map(forward);

    let bounds = quote! {
        where
            S: ::daoweave::SqlSession,
            #entity_path: for<'r> ::daoweave::sqlx::FromRow<'r, ::daoweave::SessionRow<S>> + Send + Unpin,
    };

    let items = [
        quote! {
            pub struct #name<S> {
                mapper: #mapper_path<S>,
            }
        },
        quote! {
            impl<S> #name<S>
            #bounds
            {
                pub fn new(session: S) -> Self {
                    Self {
                        mapper: #mapper_path::new(session),
                    }
                }

                pub fn mapper(&self) -> &#mapper_path<S> {
                    &self.mapper
                }
            }
        },
        quote! {
            impl<S> ::daoweave::Dao<#entity_path> for #name<S>
            #bounds
            {
                #(#base_methods)*
            }
        },
        quote! {
            impl<S> #contract_path for #name<S>
            #bounds
            {
                #(#declared_methods)*
            }
        },
    ];

    Ok(GeneratedArtifact {
        role: ArtifactRole::Impl,
        source: render_source(&type_name, &items)?,
        type_name,
        module_path: format!("{}::{}", contract.package, IMPL_MODULE),
    })
}
