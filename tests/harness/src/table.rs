use crate::utils::RESET;

/// Whether a value is left or right aligned in a table cell. Defaults to right alignment.
#[derive(Clone, Copy, Default)]
pub enum CellAlignment {
    Left,
    #[default]
    Right,
}

/// A cell in a table with the ANSI modifiers used to print it.
pub struct TableCell {
    value: String,
    modifiers: Vec<&'static str>,
    alignment: CellAlignment,
}

impl TableCell {
    pub fn new(value: String) -> TableCell {
        TableCell { value, modifiers: vec![], alignment: CellAlignment::default() }
    }

    pub fn with_modifiers(mut self, modifiers: &[&'static str]) -> TableCell {
        self.modifiers.extend_from_slice(modifiers);
        self
    }

    pub fn align_left(mut self) -> TableCell {
        self.alignment = CellAlignment::Left;
        self
    }

    /// Pad the cell to the given width. Modifiers do not count towards the width.
    fn render(&self, width: usize) -> String {
        let padding = " ".repeat(width.saturating_sub(self.value.chars().count()));

        let value = if self.modifiers.is_empty() {
            self.value.clone()
        } else {
            format!("{}{}{}", self.modifiers.concat(), self.value, RESET)
        };

        match self.alignment {
            CellAlignment::Left => format!("{}{}", value, padding),
            CellAlignment::Right => format!("{}{}", padding, value),
        }
    }
}

/// Format rows of cells as a bordered table. Every row must have the same number of cells.
pub fn format_table(rows: &[Vec<TableCell>]) -> String {
    let num_columns = rows.first().map_or(0, |row| row.len());
    debug_assert!(rows.iter().all(|row| row.len() == num_columns));

    let widths: Vec<usize> = (0..num_columns)
        .map(|column| {
            rows.iter()
                .map(|row| row[column].value.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+", separator);

    let mut lines = vec![separator.clone()];
    for row in rows {
        let cells = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {} ", cell.render(*width)))
            .collect::<Vec<_>>()
            .join("|");

        lines.push(format!("|{}|", cells));
        lines.push(separator.clone());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{format_table, TableCell};

    #[test]
    fn aligned_columns() {
        let rows = vec![
            vec![TableCell::new("".to_owned()), TableCell::new("Failed".to_owned())],
            vec![TableCell::new("yield".to_owned()).align_left(), TableCell::new("3".to_owned())],
        ];

        assert_eq!(
            format_table(&rows),
            [
                "+-------+--------+",
                "|       | Failed |",
                "+-------+--------+",
                "| yield |      3 |",
                "+-------+--------+",
            ]
            .join("\n")
        );
    }
}
