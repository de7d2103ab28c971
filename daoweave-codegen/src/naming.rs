//! Identifier conversions shared by the scanner and the synthesis engine.

/// `startTime` -> `START_TIME`: an underscore before every interior upper-case
/// letter, then everything upper-cased.
pub fn to_upper_snake(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for (i, ch) in input.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(ch);
    }
    out.to_ascii_uppercase()
}

/// `START_TIME` -> `startTime`
pub fn to_lower_camel(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = false;
    for ch in input.to_ascii_lowercase().chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// `MovieProxyMapper` -> `movie_proxy_mapper`
pub fn to_snake_case(input: &str) -> String {
    to_upper_snake(input).to_ascii_lowercase()
}

/// Case-normalized field name of an accessor: `getStartTime`, `get_start_time`
/// and `start_time` all give `startTime`.
pub fn normalize_field_name(accessor: &str) -> String {
    let base = strip_getter(accessor);
    to_lower_camel(&to_upper_snake(base))
}

fn strip_getter(accessor: &str) -> &str {
    if let Some(rest) = accessor.strip_prefix("get_") {
        if !rest.is_empty() {
            return rest;
        }
    }
    match accessor.strip_prefix("get") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => rest,
        _ => accessor,
    }
}

/// SQL column of a field. With `no_case_conversion` the field name is used
/// verbatim.
pub fn column_name(field: &str, no_case_conversion: bool) -> String {
    if no_case_conversion {
        field.to_owned()
    } else {
        to_upper_snake(&normalize_field_name(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_and_snake_fields_share_a_column() {
        assert_eq!(column_name("startTime", false), "START_TIME");
        assert_eq!(column_name("start_time", false), "START_TIME");
        assert_eq!(column_name("getStartTime", false), "START_TIME");
        assert_eq!(column_name("id", false), "ID");
    }

    #[test]
    fn no_case_conversion_keeps_field_verbatim() {
        assert_eq!(column_name("startTime", true), "startTime");
    }

    #[test]
    fn getter_prefix_needs_a_boundary() {
        assert_eq!(normalize_field_name("getaway"), "getaway");
        assert_eq!(normalize_field_name("get_name"), "name");
        assert_eq!(normalize_field_name("get"), "get");
    }

    #[test]
    fn type_names_become_module_names() {
        assert_eq!(to_snake_case("MovieProxyImpl"), "movie_proxy_impl");
        assert_eq!(to_lower_camel("LASTS"), "lasts");
    }
}
