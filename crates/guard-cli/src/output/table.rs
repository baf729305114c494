#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;
const GAP: &str = "  ";

/// Render an aligned table. Numeric cells are right-aligned; missing cells
/// show as `-`.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths = column_widths(headers, rows);
    shrink_to_fit(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, &width)| pad(&truncate(header, width), width, false, 0))
        .collect::<Vec<_>>()
        .join(GAP);

    let divider = "-".repeat(header_line.chars().count());
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line);
    lines.push(divider);

    for row in rows {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(index, &width)| {
                let text = truncate(row.get(index).map_or("-", String::as_str), width);
                let numeric = looks_numeric(&text);
                match outcome_color(&text).filter(|_| options.color) {
                    Some(code) => {
                        let painted = format!("\u{1b}[{code}m{text}\u{1b}[0m");
                        let escapes = painted.chars().count() - text.chars().count();
                        pad(&painted, width, numeric, escapes)
                    }
                    None => pad(&text, width, numeric, 0),
                }
            })
            .collect::<Vec<_>>();
        lines.push(cells.join(GAP));
    }
    lines.join("\n")
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .max(MIN_COLUMN)
        })
        .collect()
}

/// Narrow the widest column one character at a time until the row fits or
/// nothing is above its floor.
fn shrink_to_fit(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let gaps = widths.len().saturating_sub(1) * GAP.len();

    while widths.iter().sum::<usize>() + gaps > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(index, width)| **width > headers[*index].len().max(MIN_COLUMN))
            .max_by_key(|(index, width)| (**width, std::cmp::Reverse(*index)))
            .map(|(index, _)| index);
        match widest {
            Some(index) => widths[index] -= 1,
            None => break,
        }
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.'))
}

fn pad(value: &str, width: usize, right_align: bool, invisible: usize) -> String {
    let visible = value.chars().count() - invisible;
    let fill = " ".repeat(width.saturating_sub(visible));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

fn outcome_color(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "completed" | "done" => Some("32"),
        "discovered" => Some("33"),
        "failed" | "error" => Some("31"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{TableOptions, render_table};

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn columns_align_and_numbers_right_justify() {
        let rows = vec![
            vec!["auth.py".to_string(), "10".to_string()],
            vec!["services/client.py".to_string(), "3".to_string()],
        ];
        let table = render_table(&["file", "line"], &rows, PLAIN);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "file                line  ");
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2], "auth.py                 10");
        assert_eq!(lines[3], "services/client.py       3");
    }

    #[test]
    fn missing_cells_render_as_dash() {
        let rows = vec![vec!["only".to_string()]];
        let table = render_table(&["a", "b"], &rows, PLAIN);
        assert!(table.lines().nth(2).is_some_and(|line| line.trim_end().ends_with('-')));
    }

    #[test]
    fn wide_tables_are_truncated_to_fit() {
        let rows = vec![vec!["x".repeat(80), "short".to_string()]];
        let options = TableOptions {
            max_width: Some(40),
            color: false,
        };
        let table = render_table(&["text", "source"], &rows, options);
        let row = table.lines().nth(2).unwrap_or_default();
        assert_eq!(row.chars().count(), 40);
        assert!(row.contains('…'));
    }

    #[test]
    fn outcome_cells_are_colored_without_breaking_alignment() {
        let rows = vec![
            vec!["completed".to_string()],
            vec!["other".to_string()],
        ];
        let options = TableOptions {
            max_width: None,
            color: true,
        };
        let table = render_table(&["outcome"], &rows, options);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[2].starts_with("\u{1b}[32mcompleted"));
        assert_eq!(lines[3], "other    ");
    }
}
