use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Case-insensitive substring match.
pub fn contains<C: IntoColumnRef>(column: C, term: &str) -> SimpleExpr {
    lower_like(column, format!("%{}%", escape_like(&term.to_lowercase())))
}

/// Case-insensitive prefix match.
pub fn starts_with<C: IntoColumnRef>(column: C, prefix: &str) -> SimpleExpr {
    lower_like(column, format!("{}%", escape_like(&prefix.to_lowercase())))
}

fn lower_like<C: IntoColumnRef>(column: C, pattern: String) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }
}
