use std::collections::BTreeSet;

use ndarray::Array2;

use crate::skills::SkillSet;

/// Binary skill-presence matrix. Rows follow input document order; columns are
/// the sorted union of every skill seen in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatrix {
    pub columns: Vec<String>,
    pub cells: Array2<u8>,
}

impl SkillMatrix {
    pub fn build(skill_sets: &[SkillSet]) -> Self {
        let columns: Vec<String> = skill_sets
            .iter()
            .flat_map(|set| set.iter())
            .map(str::to_lowercase)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = Array2::<u8>::zeros((skill_sets.len(), columns.len()));
        for (row, set) in skill_sets.iter().enumerate() {
            let lowered: BTreeSet<String> = set.iter().map(str::to_lowercase).collect();
            for (col, label) in columns.iter().enumerate() {
                if lowered.contains(label) {
                    cells[[row, col]] = 1;
                }
            }
        }

        Self { columns, cells }
    }

    pub fn n_rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// No document in the batch had any skill.
    pub fn is_degenerate(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn to_f64(&self) -> Array2<f64> {
        self.cells.mapv(f64::from)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn set(skills: &[&str]) -> SkillSet {
        skills.iter().copied().collect()
    }

    #[test]
    fn test_columns_are_sorted_union() {
        let matrix = SkillMatrix::build(&[set(&["sql", "python"]), set(&["css", "python"])]);
        assert_eq!(matrix.columns, vec!["css", "python", "sql"]);
    }

    #[test]
    fn test_cells_mark_presence_in_row_order() {
        let matrix = SkillMatrix::build(&[
            set(&["sql", "python"]),
            set(&["css"]),
            set(&[]),
        ]);
        assert_eq!(
            matrix.cells,
            array![[0, 1, 1], [1, 0, 0], [0, 0, 0]]
        );
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.n_columns(), 3);
    }

    #[test]
    fn test_empty_union_is_degenerate() {
        let matrix = SkillMatrix::build(&[set(&[]), set(&[])]);
        assert!(matrix.is_degenerate());
        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.n_columns(), 0);
    }

    #[test]
    fn test_mixed_case_skills_share_a_column() {
        let matrix = SkillMatrix::build(&[set(&["SQL"]), set(&["sql"])]);
        assert_eq!(matrix.columns, vec!["sql"]);
        assert_eq!(matrix.cells, array![[1], [1]]);
    }
}
