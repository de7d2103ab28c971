//! Source-tree discovery of contracts, entities and hand-written impls.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Fields, FnArg, ImplItem, Item, Token, TraitItem, TypeParamBound};
use walkdir::WalkDir;

use crate::error::GenError;
use crate::extract::BASE_CONTRACT;
use crate::model::{
    Capability, ContractDescriptor, DateConversion, EntityDescriptor, ExistingImpl,
    FieldDescriptor, FieldKind, FilterConfig, MethodDescriptor, OrderConfig, SourceIndex, TypeRef,
};

/// Attribute marking a trait as a contract.
pub const CONTRACT_ATTR: &str = "dao_proxy";
/// Derive marking a struct as an entity.
pub const ENTITY_DERIVE: &str = "Entity";
/// Operation markers accepted on contract methods.
pub const MARKERS: [&str; 5] = [
    "auto_insert",
    "auto_delete",
    "auto_update",
    "auto_select",
    "auto_select_one",
];

const GENERATED_PREFIX: &str = "// @generated by daoweave";

/// Finds contracts, entities and existing implementations below a `src/` dir.
#[derive(Debug, Clone)]
pub struct ContractLocator {
    src_root: PathBuf,
}

impl ContractLocator {
    pub fn new(src_root: impl Into<PathBuf>) -> Self {
        Self {
            src_root: src_root.into(),
        }
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    pub fn locate(&self) -> Result<SourceIndex, GenError> {
        let mut index = SourceIndex::default();
        if !self.src_root.exists() {
            return Ok(index);
        }

        let mut existing = BTreeMap::new();
        let mut entries = WalkDir::new(&self.src_root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("rs"))
            .filter(|path| !should_skip_path(path, &self.src_root))
            .collect::<Vec<_>>();
        entries.sort();

        for path in entries {
            let source = std::fs::read_to_string(&path).map_err(|err| GenError::io(&path, err))?;
            if source.starts_with(GENERATED_PREFIX) {
                continue;
            }
            let parsed = syn::parse_file(&source).map_err(|source| GenError::Parse {
                path: path.clone(),
                source,
            })?;
            let (module_path, package) = module_of(&path, &self.src_root)?;
            let mut scope = Scope {
                module_path,
                package,
                index: &mut index,
                existing: &mut existing,
            };
            scope
                .collect(&parsed.items)
                .map_err(|source| GenError::Parse {
                    path: path.clone(),
                    source,
                })?;
        }

        index.existing = existing
            .into_iter()
            .map(|(self_ty, methods)| ExistingImpl { self_ty, methods })
            .collect();
        tracing::debug!(
            contracts = index.contracts.len(),
            entities = index.entities.len(),
            existing = index.existing.len(),
            "scanned source tree"
        );
        Ok(index)
    }
}

fn should_skip_path(path: &Path, src_dir: &Path) -> bool {
    if let Ok(rel) = path.strip_prefix(src_dir) {
        if let Some(first) = rel.components().next() {
            if first
                .as_os_str()
                .to_string_lossy()
                .eq_ignore_ascii_case("bin")
            {
                return true;
            }
        }
    }
    false
}

/// Module path of a file and of the directory holding it.
///
/// `src/dao/movie_dao.rs` gives `crate::dao::movie_dao` in package `crate::dao`.
pub fn module_of(path: &Path, src_root: &Path) -> Result<(String, String), GenError> {
    let rel = path
        .strip_prefix(src_root)
        .map_err(|_| GenError::InvalidPath(path.display().to_string()))?;
    let mut dirs = rel
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    let stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| GenError::InvalidPath(path.display().to_string()))?;

    let package = join_module(&dirs);
    let module = match stem.as_str() {
        "mod" => package.clone(),
        "lib" | "main" if dirs.is_empty() => package.clone(),
        _ => {
            dirs.push(stem);
            join_module(&dirs)
        }
    };
    Ok((module, package))
}

fn join_module(segments: &[String]) -> String {
    std::iter::once("crate")
        .chain(segments.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("::")
}

struct Scope<'a> {
    module_path: String,
    package: String,
    index: &'a mut SourceIndex,
    existing: &'a mut BTreeMap<String, std::collections::BTreeSet<String>>,
}

impl Scope<'_> {
    fn collect(&mut self, items: &[Item]) -> syn::Result<()> {
        for item in items {
            match item {
                Item::Struct(item_struct) => {
                    if has_derive(&item_struct.attrs, ENTITY_DERIVE) {
                        let entity = entity_from_struct(item_struct, &self.module_path)?;
                        self.index.entities.push(entity);
                    }
                }
                Item::Trait(item_trait) => {
                    if is_contract(item_trait) {
                        let contract =
                            contract_from_trait(item_trait, &self.module_path, &self.package)?;
                        self.index.contracts.push(contract);
                    }
                }
                Item::Impl(item_impl) => {
                    if item_impl.trait_.is_none() {
                        continue;
                    }
                    let Some(self_ty) = type_name(&item_impl.self_ty) else {
                        continue;
                    };
                    let methods = self.existing.entry(self_ty).or_default();
                    for impl_item in &item_impl.items {
                        if let ImplItem::Fn(method) = impl_item {
                            methods.insert(method.sig.ident.unraw().to_string());
                        }
                    }
                }
                Item::Mod(item_mod) => {
                    if let Some((_, items)) = &item_mod.content {
                        let mut nested = Scope {
                            module_path: format!("{}::{}", self.module_path, item_mod.ident),
                            package: self.package.clone(),
                            index: &mut *self.index,
                            existing: &mut *self.existing,
                        };
                        nested.collect(items)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn last_ident(path: &syn::Path) -> Option<String> {
    path.segments.last().map(|seg| seg.ident.to_string())
}

fn type_name(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(path) => last_ident(&path.path),
        _ => None,
    }
}

fn has_derive(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| {
        if !attr.path().is_ident("derive") {
            return false;
        }
        let paths: Result<Punctuated<syn::Path, Token![,]>, _> =
            attr.parse_args_with(Punctuated::parse_terminated);
        if let Ok(paths) = paths {
            return paths
                .iter()
                .any(|path| last_ident(path).is_some_and(|ident| ident == name));
        }
        false
    })
}

fn attr_named<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs
        .iter()
        .find(|attr| last_ident(attr.path()).is_some_and(|ident| ident == name))
}

fn is_contract(item: &syn::ItemTrait) -> bool {
    attr_named(&item.attrs, CONTRACT_ATTR).is_some()
        || supertraits(item)
            .iter()
            .any(|supertrait| supertrait.name == BASE_CONTRACT)
}

fn supertraits(item: &syn::ItemTrait) -> Vec<TypeRef> {
    item.supertraits
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(bound) => bound.path.segments.last(),
            _ => None,
        })
        .map(|segment| {
            let args = match &segment.arguments {
                syn::PathArguments::AngleBracketed(args) => args
                    .args
                    .iter()
                    .filter_map(|arg| match arg {
                        syn::GenericArgument::Type(ty) => {
                            Some(quote::quote!(#ty).to_string().replace(' ', ""))
                        }
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            TypeRef {
                name: segment.ident.to_string(),
                args,
            }
        })
        .collect()
}

/// `#[dao_proxy(output = "...")]`; `None` when the attribute or key is absent.
pub fn contract_output(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let Some(attr) = attr_named(attrs, CONTRACT_ATTR) else {
        return Ok(None);
    };
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(None);
    }
    let mut output = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("output") {
            let lit: syn::LitStr = meta.value()?.parse()?;
            output = Some(lit.value());
            Ok(())
        } else {
            Err(meta.error("unsupported dao_proxy option"))
        }
    })?;
    Ok(output)
}

/// Parses `dao_proxy` arguments given directly to the attribute macro.
pub fn parse_output_args(args: proc_macro2::TokenStream) -> syn::Result<Option<String>> {
    let mut output = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("output") {
            let lit: syn::LitStr = meta.value()?.parse()?;
            output = Some(lit.value());
            Ok(())
        } else {
            Err(meta.error("unsupported dao_proxy option"))
        }
    });
    syn::parse::Parser::parse2(parser, args)?;
    Ok(output)
}

/// Contract descriptor of a trait declared in `module_path`.
pub fn contract_from_trait(
    item: &syn::ItemTrait,
    module_path: &str,
    package: &str,
) -> syn::Result<ContractDescriptor> {
    let mut methods = Vec::new();
    for trait_item in &item.items {
        let TraitItem::Fn(method) = trait_item else {
            continue;
        };
        let params = method
            .sig
            .inputs
            .iter()
            .filter(|arg| matches!(arg, FnArg::Typed(_)))
            .count();
        let mut markers = Vec::new();
        for attr in &method.attrs {
            if let Some(marker) = parse_marker(attr)? {
                markers.push(marker);
            }
        }
        methods.push(MethodDescriptor {
            name: method.sig.ident.unraw().to_string(),
            params,
            markers,
        });
    }

    Ok(ContractDescriptor {
        name: item.ident.to_string(),
        module_path: module_path.to_owned(),
        package: package.to_owned(),
        supertraits: supertraits(item),
        output: contract_output(&item.attrs)?,
        methods,
    })
}

/// Whether an attribute is one of the operation markers.
pub fn is_marker(attr: &Attribute) -> bool {
    last_ident(attr.path()).is_some_and(|ident| MARKERS.contains(&ident.as_str()))
}

/// Capability of an operation marker; `None` for any other attribute.
pub fn parse_marker(attr: &Attribute) -> syn::Result<Option<Capability>> {
    let Some(name) = last_ident(attr.path()) else {
        return Ok(None);
    };
    if !MARKERS.contains(&name.as_str()) {
        return Ok(None);
    }
    let bare = matches!(attr.meta, syn::Meta::Path(_));

    if name == "auto_insert" {
        let mut id_seq = false;
        if !bare {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id_seq") {
                    id_seq = if meta.input.peek(Token![=]) {
                        let lit: syn::LitBool = meta.value()?.parse()?;
                        lit.value
                    } else {
                        true
                    };
                    Ok(())
                } else {
                    Err(meta.error("unsupported auto_insert option"))
                }
            })?;
        }
        return Ok(Some(Capability::Insert { id_seq }));
    }

    let select = name == "auto_select";
    let mut filter = FilterConfig::default();
    let mut order = OrderConfig::default();
    if !bare {
        attr.parse_nested_meta(|meta| {
            let target = if meta.path.is_ident("other") {
                &mut filter.other
            } else if meta.path.is_ident("compare") {
                &mut filter.compare
            } else if select && meta.path.is_ident("order_by") {
                &mut order.order_by
            } else if select && meta.path.is_ident("order_desc_by") {
                &mut order.order_desc_by
            } else {
                return Err(meta.error(format!("unsupported {} option", name)));
            };
            target.extend(parse_string_list(meta.value()?)?);
            Ok(())
        })?;
    }

    Ok(Some(match name.as_str() {
        "auto_delete" => Capability::Delete { filter },
        "auto_update" => Capability::Update { filter },
        "auto_select_one" => Capability::SelectOne { filter },
        _ => Capability::Select { filter, order },
    }))
}

/// `"a"` or `["a", "b"]`
fn parse_string_list(input: syn::parse::ParseStream<'_>) -> syn::Result<Vec<String>> {
    if input.peek(syn::token::Bracket) {
        let content;
        syn::bracketed!(content in input);
        let items = Punctuated::<syn::LitStr, Token![,]>::parse_terminated(&content)?;
        Ok(items.iter().map(syn::LitStr::value).collect())
    } else {
        let lit: syn::LitStr = input.parse()?;
        Ok(vec![lit.value()])
    }
}

/// `#[table("MOVIE")]` or `#[table(name = "MOVIE")]`
fn table_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("table")) else {
        return Ok(None);
    };
    if let Ok(lit) = attr.parse_args::<syn::LitStr>() {
        return Ok(Some(lit.value()));
    }
    let mut table = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let lit: syn::LitStr = meta.value()?.parse()?;
            table = Some(lit.value());
            Ok(())
        } else {
            Err(meta.error("expected #[table(\"NAME\")]"))
        }
    })?;
    Ok(table)
}

fn has_dao_flag(attrs: &[Attribute], flag: &str) -> bool {
    attrs.iter().filter(|attr| attr.path().is_ident("dao")).any(|attr| {
        attr.parse_args_with(Punctuated::<syn::Ident, Token![,]>::parse_terminated)
            .is_ok_and(|args| args.iter().any(|ident| ident == flag))
    })
}

fn id_sequence(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("id")) else {
        return Ok(None);
    };
    let mut seq = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("seq") {
            let lit: syn::LitStr = meta.value()?.parse()?;
            seq = Some(lit.value());
            Ok(())
        } else {
            Err(meta.error("expected #[id(seq = \"SEQUENCE\")]"))
        }
    })?;
    seq.map(Some)
        .ok_or_else(|| syn::Error::new_spanned(attr, "#[id] requires seq = \"...\""))
}

fn date_conversion(attrs: &[Attribute]) -> syn::Result<Option<DateConversion>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("sql_date")) else {
        return Ok(None);
    };
    let mut date = DateConversion::default();
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(Some(date));
    }
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("func") {
            let lit: syn::LitStr = meta.value()?.parse()?;
            date.function = lit.value();
            Ok(())
        } else if meta.path.is_ident("pattern") {
            let lit: syn::LitStr = meta.value()?.parse()?;
            date.pattern = lit.value();
            Ok(())
        } else {
            Err(meta.error("unsupported sql_date option"))
        }
    })?;
    Ok(Some(date))
}

/// Innermost type name, looking through `Option<..>`.
fn field_type_name(ty: &syn::Type) -> Option<String> {
    let syn::Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident == "Option" {
        if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
            if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                return field_type_name(inner);
            }
        }
        return None;
    }
    Some(segment.ident.to_string())
}

/// Entity descriptor of a `#[derive(Entity)]` struct declared in `module_path`.
///
/// Fields of unsupported types are left out.
pub fn entity_from_struct(item: &syn::ItemStruct, module_path: &str) -> syn::Result<EntityDescriptor> {
    let fields = match &item.fields {
        Fields::Named(named) => &named.named,
        Fields::Unit => return Err(syn::Error::new_spanned(item, "Entity must have fields")),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(item, "Entity must use named fields"));
        }
    };

    let mut descriptors = Vec::with_capacity(fields.len());
    for field in fields {
        if has_dao_flag(&field.attrs, "ignore") {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "Field must have an ident"))?;
        let Some(kind) = field_type_name(&field.ty)
            .as_deref()
            .and_then(FieldKind::from_type_name)
        else {
            tracing::debug!(entity = %item.ident, field = %ident, "skipping unsupported field type");
            continue;
        };
        descriptors.push(FieldDescriptor {
            name: ident.unraw().to_string(),
            kind,
            date: date_conversion(&field.attrs)?,
            id_seq: id_sequence(&field.attrs)?,
        });
    }

    Ok(EntityDescriptor {
        name: item.ident.to_string(),
        module_path: module_path.to_owned(),
        table: table_name(&item.attrs)?,
        no_case_conversion: item.attrs.iter().any(|attr| attr.path().is_ident("non_camel_case")),
        fields: descriptors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn module_paths_follow_file_layout() {
        let root = Path::new("/p/src");
        let cases = [
            ("/p/src/lib.rs", "crate", "crate"),
            ("/p/src/dao/mod.rs", "crate::dao", "crate::dao"),
            ("/p/src/dao/movie_dao.rs", "crate::dao::movie_dao", "crate::dao"),
            ("/p/src/entity.rs", "crate::entity", "crate"),
        ];
        for (path, module, package) in cases {
            let (m, p) = module_of(Path::new(path), root).unwrap();
            assert_eq!((m.as_str(), p.as_str()), (module, package), "{}", path);
        }
    }

    #[test]
    fn entity_fields_keep_order_and_markers() {
        let item: syn::ItemStruct = parse_quote! {
            #[derive(Debug, Entity)]
            #[table("MOVIE")]
            pub struct Movie {
                #[id(seq = "MOVIE_SEQ")]
                pub id: Option<i32>,
                pub name: Option<String>,
                pub lasts: Option<i64>,
                #[sql_date(pattern = "%Y-%m-%d")]
                pub start_time: Option<String>,
                #[dao(ignore)]
                pub cache: Option<String>,
                pub tags: Vec<String>,
            }
        };
        let entity = entity_from_struct(&item, "crate::entity").unwrap();
        assert_eq!(entity.table.as_deref(), Some("MOVIE"));
        let names = entity.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["id", "name", "lasts", "start_time"]);
        assert_eq!(entity.fields[0].id_seq.as_deref(), Some("MOVIE_SEQ"));
        assert_eq!(entity.fields[2].kind, FieldKind::Long);
        let date = entity.fields[3].date.as_ref().unwrap();
        assert_eq!(date.function, "STR_TO_DATE");
        assert_eq!(date.pattern, "%Y-%m-%d");
    }

    #[test]
    fn table_accepts_name_key_and_case_marker() {
        let item: syn::ItemStruct = parse_quote! {
            #[derive(Entity)]
            #[table(name = "MOVIE")]
            #[non_camel_case]
            struct Movie { startTime: String }
        };
        let entity = entity_from_struct(&item, "crate").unwrap();
        assert_eq!(entity.table.as_deref(), Some("MOVIE"));
        assert!(entity.no_case_conversion);
    }

    #[test]
    fn contract_markers_are_parsed() {
        let item: syn::ItemTrait = parse_quote! {
            #[dao_proxy(output = "crate::mapper")]
            pub trait MovieDao: Dao<Movie> {
                #[auto_select(other = ["LASTS -> LASTS = 90 OR LASTS = 80"], order_desc_by = "ID")]
                fn select_by_lasts_limits(&self, movie: &Movie)
                    -> impl Future<Output = DaoResult<Vec<Movie>>> + Send;
                #[auto_update(compare = "NAME:LIKE")]
                fn update_by_name(&self, set: &Movie, con: &Movie)
                    -> impl Future<Output = DaoResult<u64>> + Send;
                #[auto_insert(id_seq)]
                fn insert_with_seq(&self, movie: &Movie)
                    -> impl Future<Output = DaoResult<u64>> + Send;
                #[auto_delete]
                #[doc = "plain"]
                fn delete_all(&self, movie: &Movie)
                    -> impl Future<Output = DaoResult<u64>> + Send;
            }
        };
        let contract = contract_from_trait(&item, "crate::dao::movie_dao", "crate::dao").unwrap();
        assert_eq!(contract.output.as_deref(), Some("crate::mapper"));
        assert_eq!(contract.supertraits[0].args, ["Movie"]);

        let select = &contract.methods[0];
        assert_eq!(select.params, 1);
        match &select.markers[..] {
            [Capability::Select { filter, order }] => {
                assert_eq!(filter.other, ["LASTS -> LASTS = 90 OR LASTS = 80"]);
                assert_eq!(order.order_desc_by, ["ID"]);
            }
            other => panic!("unexpected markers {:?}", other),
        }
        assert_eq!(contract.methods[1].params, 2);
        assert_eq!(contract.methods[2].markers, [Capability::Insert { id_seq: true }]);
        assert_eq!(
            contract.methods[3].markers,
            [Capability::Delete { filter: FilterConfig::default() }]
        );
    }

    #[test]
    fn unknown_marker_option_is_an_error() {
        let attr: Attribute = parse_quote!(#[auto_delete(order_by = "ID")]);
        assert!(parse_marker(&attr).is_err());
    }

    #[test]
    fn bare_dao_proxy_has_no_output() {
        let item: syn::ItemTrait = parse_quote! {
            #[dao_proxy]
            pub trait MovieDao: Dao<Movie> {}
        };
        let contract = contract_from_trait(&item, "crate", "crate").unwrap();
        assert!(contract.output.is_none());
        assert!(is_contract(&item));
    }

    #[test]
    fn output_args_parse_from_tokens() {
        let output = parse_output_args(quote::quote!(output = "crate::mapper")).unwrap();
        assert_eq!(output.as_deref(), Some("crate::mapper"));
        assert!(parse_output_args(quote::quote!(target = "x")).is_err());
    }
}
