/// Strip parentheses that wrap the whole expression, repeatedly.
///
/// `((a + b))` becomes `a + b`, while `(a) + (b)` is left alone because its
/// first and last parentheses do not pair with each other. Parentheses
/// inside quoted literals and identifiers are not counted.
pub fn remove_unnecessary_brackets(sql: &str) -> &str {
    let mut current = sql.trim();
    while current.len() > 1
        && current.starts_with('(')
        && current.ends_with(')')
        && outer_pair_wraps_all(current)
    {
        current = current[1..current.len() - 1].trim();
    }
    current
}

/// Normalise an optional SQL fragment for comparison.
pub fn normalize(sql: Option<&str>) -> Option<&str> {
    sql.map(remove_unnecessary_brackets)
}

fn outer_pair_wraps_all(sql: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let last = sql.len() - 1;

    for (idx, ch) in sql.char_indices() {
        match quote {
            Some(open) => {
                if ch == open {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' | '[' => quote = Some(if ch == '[' { ']' } else { ch }),
                '(' => depth += 1,
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 && idx != last {
                        return false;
                    }
                }
                _ => {}
            },
        }
    }
    depth == 0
}
