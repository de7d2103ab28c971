//! Contract validation: entity resolution and method classification.

use crate::error::GenError;
use crate::model::{ClassifiedMethod, ContractDescriptor, EntityDescriptor, base_methods};

/// Name of the base contract every data-access trait must extend.
pub const BASE_CONTRACT: &str = "Dao";

/// The single type argument of the contract's `Dao<E>` supertrait.
pub fn dao_type_argument(contract: &ContractDescriptor) -> Result<&str, GenError> {
    let dao = contract
        .supertraits
        .iter()
        .find(|supertrait| supertrait.name == BASE_CONTRACT)
        .ok_or_else(|| GenError::ContractType {
            contract: contract.name.clone(),
            reason: format!("does not extend {}<Entity>", BASE_CONTRACT),
        })?;
    match dao.args.as_slice() {
        [entity] => Ok(entity.as_str()),
        args => Err(GenError::ContractType {
            contract: contract.name.clone(),
            reason: format!(
                "{} must name exactly one entity type, found {}",
                BASE_CONTRACT,
                args.len()
            ),
        }),
    }
}

/// Resolves the contract's entity against the known entities.
pub fn extract_entity_type<'a>(
    contract: &ContractDescriptor,
    entities: &'a [EntityDescriptor],
) -> Result<&'a EntityDescriptor, GenError> {
    let argument = dao_type_argument(contract)?;
    let name = argument.rsplit("::").next().unwrap_or(argument).trim();
    entities
        .iter()
        .find(|entity| entity.name == name)
        .ok_or_else(|| GenError::ContractType {
            contract: contract.name.clone(),
            reason: format!("`{}` is not a known #[derive(Entity)] type", argument),
        })
}

/// Base methods first, then declared methods in declaration order. Methods
/// without a marker are left out.
pub fn classify_methods(contract: &ContractDescriptor) -> Result<Vec<ClassifiedMethod>, GenError> {
    let base = base_methods();
    if let Some(redeclared) = contract
        .methods
        .iter()
        .find(|method| base.iter().any(|b| b.name == method.name))
    {
        return Err(GenError::ContractType {
            contract: contract.name.clone(),
            reason: format!("redeclares `{}` from {}", redeclared.name, BASE_CONTRACT),
        });
    }

    let mut classified: Vec<ClassifiedMethod> = Vec::with_capacity(base.len() + contract.methods.len());
    for method in base.iter().chain(&contract.methods) {
        let capability = match method.markers.as_slice() {
            [] => continue,
            [capability] => capability,
            markers => {
                return Err(GenError::ConflictingCapability {
                    contract: contract.name.clone(),
                    method: method.name.clone(),
                    markers: markers
                        .iter()
                        .map(|marker| marker.marker())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        };

        if method.params != capability.arity() {
            return Err(GenError::MethodArity {
                contract: contract.name.clone(),
                method: method.name.clone(),
                capability: capability.marker(),
                expected: capability.arity(),
                found: method.params,
            });
        }

        if let Some(previous) = classified.iter().find(|c| &c.capability == capability) {
            return Err(GenError::DuplicateCapability {
                contract: contract.name.clone(),
                method: method.name.clone(),
                previous: previous.name.clone(),
                capability: capability.marker(),
            });
        }

        classified.push(ClassifiedMethod {
            name: method.name.clone(),
            capability: capability.clone(),
        });
    }

    tracing::debug!(
        contract = %contract.name,
        methods = classified.len(),
        "classified contract methods"
    );
    Ok(classified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Capability, FilterConfig, MethodDescriptor, OrderConfig, TypeRef};

    fn contract(methods: Vec<MethodDescriptor>) -> ContractDescriptor {
        ContractDescriptor {
            name: "MovieDao".to_owned(),
            module_path: "crate::dao::movie_dao".to_owned(),
            package: "crate::dao".to_owned(),
            supertraits: vec![TypeRef {
                name: "Dao".to_owned(),
                args: vec!["Movie".to_owned()],
            }],
            output: Some("crate::mapper".to_owned()),
            methods,
        }
    }

    fn select(other: &[&str]) -> Capability {
        Capability::Select {
            filter: FilterConfig {
                other: other.iter().map(|s| (*s).to_owned()).collect(),
                compare: Vec::new(),
            },
            order: OrderConfig::default(),
        }
    }

    #[test]
    fn base_methods_come_first() {
        let methods = classify_methods(&contract(vec![MethodDescriptor::new(
            "select_by_lasts_limits",
            1,
            select(&["LASTS -> LASTS = 90 OR LASTS = 80"]),
        )]))
        .unwrap();
        let names = methods.iter().map(|m| m.name.as_str()).collect::<Vec<_>>();
        assert_eq!(
            names,
            ["insert", "delete", "update", "select_one", "select", "select_by_lasts_limits"]
        );
    }

    #[test]
    fn unmarked_methods_are_ignored() {
        let mut helper = MethodDescriptor::new("count", 0, Capability::Insert { id_seq: true });
        helper.markers.clear();
        assert_eq!(classify_methods(&contract(vec![helper])).unwrap().len(), 5);
    }

    #[test]
    fn insert_with_two_parameters_is_rejected() {
        let err = classify_methods(&contract(vec![MethodDescriptor::new(
            "insert_pair",
            2,
            Capability::Insert { id_seq: true },
        )]))
        .unwrap_err();
        assert!(matches!(
            err,
            GenError::MethodArity { expected: 1, found: 2, .. }
        ));
    }

    #[test]
    fn update_needs_two_parameters() {
        let err = classify_methods(&contract(vec![MethodDescriptor::new(
            "update_name",
            1,
            Capability::Update {
                filter: FilterConfig {
                    other: Vec::new(),
                    compare: vec!["NAME:LIKE".to_owned()],
                },
            },
        )]))
        .unwrap_err();
        assert!(matches!(err, GenError::MethodArity { expected: 2, .. }));
    }

    #[test]
    fn two_markers_conflict() {
        let mut method = MethodDescriptor::new("both", 1, Capability::Insert { id_seq: true });
        method.markers.push(select(&["ID -> ID > 0"]));
        let err = classify_methods(&contract(vec![method])).unwrap_err();
        match err {
            GenError::ConflictingCapability { markers, .. } => {
                assert_eq!(markers, "auto_insert, auto_select");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn identical_configuration_is_a_duplicate() {
        let err = classify_methods(&contract(vec![
            MethodDescriptor::new("first", 1, select(&["ID -> ID > 0"])),
            MethodDescriptor::new("second", 1, select(&["ID -> ID > 0"])),
        ]))
        .unwrap_err();
        match err {
            GenError::DuplicateCapability { method, previous, .. } => {
                assert_eq!(method, "second");
                assert_eq!(previous, "first");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn default_marker_duplicates_base_method() {
        let err = classify_methods(&contract(vec![MethodDescriptor::new(
            "select_all",
            1,
            select(&[]),
        )]))
        .unwrap_err();
        assert!(matches!(err, GenError::DuplicateCapability { .. }));
    }

    #[test]
    fn entity_resolves_by_last_path_segment() {
        let movie = EntityDescriptor {
            name: "Movie".to_owned(),
            module_path: "crate::entity".to_owned(),
            table: Some("MOVIE".to_owned()),
            no_case_conversion: false,
            fields: Vec::new(),
        };
        let mut dao = contract(Vec::new());
        dao.supertraits[0].args = vec!["crate::entity::Movie".to_owned()];
        let entities = [movie];
        assert_eq!(extract_entity_type(&dao, &entities).unwrap().name, "Movie");
    }

    #[test]
    fn missing_dao_supertrait_is_a_type_error() {
        let mut dao = contract(Vec::new());
        dao.supertraits.clear();
        assert!(matches!(
            extract_entity_type(&dao, &[]),
            Err(GenError::ContractType { .. })
        ));

        let mut dao = contract(Vec::new());
        dao.supertraits[0].args.clear();
        assert!(dao_type_argument(&dao).is_err());
    }

    #[test]
    fn unknown_entity_is_a_type_error() {
        let err = extract_entity_type(&contract(Vec::new()), &[]).unwrap_err();
        assert!(err.to_string().contains("Movie"));
    }
}
