//! Grading rubric: an ordered list of weighted criteria.
//!
//! Criteria are numbered from 1 in the order they appear, and the numbering
//! is the contract with the model: the model answers with the ids of the
//! criteria a response satisfies, and [`Rubric::assess`] turns those ids
//! back into a score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Weight assigned to every criterion parsed from rubric text.
pub const DEFAULT_WEIGHT: u32 = 1;

/// A single grading criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    /// The criterion as shown to the model.
    pub text: String,
    /// Marks awarded when the criterion is satisfied.
    pub weight: u32,
}

/// An ordered, 1-indexed list of grading criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    criteria: Vec<Criterion>,
}

impl Rubric {
    /// Parses a rubric from line-delimited text.
    ///
    /// Each trimmed non-blank line becomes one criterion with weight
    /// [`DEFAULT_WEIGHT`]; weights above 1 are only ever set through
    /// [`Rubric::set_weight`], never through rubric syntax.
    pub fn from_text(text: &str) -> Self {
        let criteria = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Criterion {
                text: line.to_string(),
                weight: DEFAULT_WEIGHT,
            })
            .collect();
        Self { criteria }
    }

    /// True when the rubric holds no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// The criteria, in id order (criterion id = slice index + 1).
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Sets the weight of the criterion with the given 1-based id.
    ///
    /// Returns false when no such criterion exists.
    pub fn set_weight(&mut self, id: usize, weight: u32) -> bool {
        match id
            .checked_sub(1)
            .and_then(|index| self.criteria.get_mut(index))
        {
            Some(criterion) => {
                criterion.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Sum of all criterion weights: the score of a response that satisfies
    /// everything.
    pub fn total_weight(&self) -> u32 {
        self.criteria.iter().map(|c| c.weight).sum()
    }

    /// Scores a set of satisfied criterion ids.
    ///
    /// Duplicate ids count once, and ids outside `1..=len` (zero and
    /// negatives included) are silently ignored. An empty set is a real
    /// score of 0.
    pub fn assess(&self, ids: &[i64]) -> u32 {
        let satisfied: BTreeSet<i64> = ids.iter().copied().collect();
        satisfied
            .into_iter()
            .filter_map(|id| usize::try_from(id).ok())
            .filter_map(|id| id.checked_sub(1))
            .filter_map(|index| self.criteria.get(index))
            .map(|criterion| criterion.weight)
            .sum()
    }
}

/// Renders the rubric as the numbered list embedded in grading prompts:
/// one `id: text` line per criterion.
impl fmt::Display for Rubric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, criterion) in self.criteria.iter().enumerate() {
            writeln!(f, "{}: {}", index + 1, criterion.text)?;
        }
        Ok(())
    }
}
