//! `ZOHO_CRITERIA` clause construction.
//!
//! The service filters rows with a small criteria mini-language; its
//! grammar is a fixed external contract, so the builders here reproduce
//! the exact clause forms the service accepts, spacing included.

// TODO: escape single quotes in values once the service documents an
// escape syntax for its criteria mini-language.

/// One `"column"='value'` comparison.
fn equals(column: &str, value: &str) -> String {
    format!("\"{column}\"='{value}'")
}

/// Conjunction of comparisons for an EXPORT: `("a"='1' and "b"='2')`.
pub(crate) fn conjunction(conditions: &[(&str, &str)]) -> String {
    let clauses: Vec<String> = conditions
        .iter()
        .map(|(column, value)| equals(column, value))
        .collect();
    format!("({})", clauses.join(" and "))
}

/// Row-identity clause for an UPDATE: `("id" = '<id>')`.
pub(crate) fn update_by_id(id: &str) -> String {
    format!("(\"id\" = '{id}')")
}

/// Row-identity clause for a DELETE: `("id"='<id>')`.
pub(crate) fn delete_by_id(id: &str) -> String {
    format!("(\"id\"='{id}')")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_condition() {
        assert_eq!(conjunction(&[("id", "4537")]), "(\"id\"='4537')");
    }

    #[test]
    fn test_conjunction_preserves_order() {
        let clause = conjunction(&[("Campaign", "Spring"), ("AdGroup", "Techies")]);
        assert_eq!(clause, "(\"Campaign\"='Spring' and \"AdGroup\"='Techies')");
    }

    #[test]
    fn test_update_clause_has_spaces() {
        assert_eq!(update_by_id("4537"), "(\"id\" = '4537')");
    }

    #[test]
    fn test_delete_clause_is_compact() {
        assert_eq!(delete_by_id("4537"), "(\"id\"='4537')");
    }
}
