//! Flattened text rendering of a log tree.

use schemadrift_core::{CompareLog, CompareState};

/// Render every non-`Ok`, non-ignored node depth-first, one per line.
///
/// Each line carries the names of its ancestors below the outermost one as
/// a `Name->` prefix, so `Book->Property 'Title'` reads as the `Title`
/// property of entity `Book`.
pub fn flatten(logs: &[CompareLog]) -> String {
    let mut lines = Vec::new();
    for log in logs {
        walk(log, &mut Vec::new(), &mut lines, true);
    }
    lines.join("\n")
}

fn walk<'l>(log: &'l CompareLog, path: &mut Vec<&'l str>, lines: &mut Vec<String>, outermost: bool) {
    if log.state != CompareState::Ok && !log.ignored {
        let prefix: String = path.iter().map(|name| format!("{name}->")).collect();
        lines.push(log.render(&prefix));
    }

    if !outermost {
        path.push(&log.name);
    }
    for child in &log.sub_logs {
        walk(child, path, lines, false);
    }
    if !outermost {
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemadrift_core::{CompareAttribute, CompareType};

    fn log(compare_type: CompareType, state: CompareState, name: &str) -> CompareLog {
        CompareLog::new(
            compare_type,
            state,
            name,
            CompareAttribute::NotSet,
            None,
            None,
        )
    }

    #[test]
    fn prefixes_ancestors_below_the_root() {
        let mut title = log(CompareType::Property, CompareState::NotInDatabase, "Title");
        title.attribute = CompareAttribute::ColumnName;
        title.expected = Some("Title".to_string());

        let mut book = log(CompareType::Entity, CompareState::Ok, "Book");
        book.sub_logs.push(title);
        let mut context = log(CompareType::DbContext, CompareState::Ok, "BookContext");
        context.sub_logs.push(book);

        assert_eq!(
            flatten(&[context]),
            "NOT IN DATABASE: Book->Property 'Title', column name. Expected = Title"
        );
    }

    #[test]
    fn skips_ok_and_ignored_nodes() {
        let mut ignored = log(CompareType::Index, CompareState::NotInDatabase, "Title");
        ignored.ignored = true;
        let mut context = log(CompareType::DbContext, CompareState::Ok, "BookContext");
        context.sub_logs.push(log(CompareType::Entity, CompareState::Ok, "Book"));
        context.sub_logs.push(ignored);

        assert_eq!(flatten(&[context]), "");
    }
}
