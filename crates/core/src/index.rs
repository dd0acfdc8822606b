//! Secondary index naming and search planning.
//!
//! Indexes follow the `<attribute>-index` naming convention, so an index can
//! be addressed either by its full name or by the attribute it is keyed on.

use crate::record::Attribute;

/// Suffix shared by every secondary index name.
pub const INDEX_SUFFIX: &str = "-index";

/// Attribute the country filter applies to.
pub const COUNTRY_ATTR: &str = "country";

/// Returns the index name for an attribute.
///
/// Pattern: `<attribute>-index`
pub fn index_name_for(attribute: &str) -> String {
    format!("{attribute}{INDEX_SUFFIX}")
}

/// Reduces a full index name to the attribute it is keyed on.
///
/// Names without the `-index` suffix are returned unchanged.
pub fn normalize_index(index: &str) -> &str {
    if index.contains(INDEX_SUFFIX) {
        index.split('-').next().unwrap_or(index)
    } else {
        index
    }
}

/// Undoes the URL-style space encoding some callers send.
pub fn normalize_search_value(value: &str) -> String {
    if value == "new+haven" {
        "new haven".to_string()
    } else {
        value.to_string()
    }
}

/// Maps country aliases onto the stored country name.
pub fn normalize_country(country: &str) -> String {
    if country == "newhaven" {
        "new haven".to_string()
    } else {
        country.to_string()
    }
}

/// A planned query against a secondary index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub index_name: String,
    pub key_attribute: String,
    pub value: Attribute,
    pub filters: Vec<(String, Attribute)>,
}

/// Plans a search on `index` for `value`, optionally scoped to a country.
///
/// Searching the country index itself skips the country filter since the key
/// condition already pins it.
pub fn plan_index_query(index: &str, value: &str, country: Option<&str>) -> IndexQuery {
    let key_attribute = normalize_index(index).to_string();
    let value = normalize_search_value(value);

    let filters = match country {
        Some(c) if key_attribute != COUNTRY_ATTR => {
            vec![(COUNTRY_ATTR.to_string(), Attribute::S(c.to_string()))]
        }
        _ => Vec::new(),
    };

    IndexQuery {
        index_name: index_name_for(&key_attribute),
        key_attribute,
        value: Attribute::S(value),
        filters,
    }
}
