use serde::{Deserialize, Serialize};

use crate::types::SqlTypeName;

/// A SQL type as the validator resolved it: family, nullability and, for
/// structured types, the component types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelType {
    pub name: SqlTypeName,
    pub nullable: bool,
    /// Element type of ARRAY / MULTISET, value type of MAP.
    pub component: Option<Box<RelType>>,
    /// Key type of MAP.
    pub key: Option<Box<RelType>>,
    /// Field types of ROW.
    pub fields: Vec<RelType>,
}

impl RelType {
    pub fn new(name: SqlTypeName) -> Self {
        Self { name, nullable: false, component: None, key: None, fields: Vec::new() }
    }

    pub fn nullable(name: SqlTypeName) -> Self {
        Self { nullable: true, ..Self::new(name) }
    }

    pub fn array(component: RelType) -> Self {
        Self { component: Some(Box::new(component)), ..Self::new(SqlTypeName::Array) }
    }

    pub fn multiset(component: RelType) -> Self {
        Self { component: Some(Box::new(component)), ..Self::new(SqlTypeName::Multiset) }
    }

    pub fn map(key: RelType, value: RelType) -> Self {
        Self {
            key: Some(Box::new(key)),
            component: Some(Box::new(value)),
            ..Self::new(SqlTypeName::Map)
        }
    }

    pub fn row(fields: Vec<RelType>) -> Self {
        Self { fields, ..Self::new(SqlTypeName::Row) }
    }

    pub fn with_nullability(&self, nullable: bool) -> RelType {
        RelType { nullable, ..self.clone() }
    }

    /// True when the two types differ at most in top-level nullability.
    pub fn equal_sans_nullability(&self, other: &RelType) -> bool {
        self.name == other.name
            && self.component == other.component
            && self.key == other.key
            && self.fields == other.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_sans_nullability_ignores_only_the_top_flag() {
        let a = RelType::new(SqlTypeName::Integer);
        let b = RelType::nullable(SqlTypeName::Integer);
        assert_ne!(a, b);
        assert!(a.equal_sans_nullability(&b));

        let arr_a = RelType::array(RelType::new(SqlTypeName::Integer));
        let arr_b = RelType::array(RelType::nullable(SqlTypeName::Integer));
        assert!(!arr_a.equal_sans_nullability(&arr_b));
    }

    #[test]
    fn with_nullability_keeps_components() {
        let m = RelType::map(RelType::new(SqlTypeName::Varchar), RelType::new(SqlTypeName::BigInt));
        let n = m.with_nullability(true);
        assert!(n.nullable);
        assert_eq!(n.key, m.key);
        assert_eq!(n.component, m.component);
    }
}
