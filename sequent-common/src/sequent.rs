//! Entailment claims

use crate::{
    formula::Formula,
    memory::{HeapSpace, Vector},
    output::unreachable,
    tableau::Tableau,
};
use sequent_macros::HeapSpace;
use std::fmt;

/// An ordered list of formulas: one side of a sequent.
pub type FormulaList = Vector<Formula>;

/// The claim that the premises entail the conclusions
///
/// A sequent is valid iff every assignment that makes all premises true
/// makes at least one conclusion true.
#[derive(Debug, PartialEq, Eq, Clone, Default, HeapSpace)]
pub struct Sequent {
    /// Left-hand side, read conjunctively
    pub premises: FormulaList,
    /// Right-hand side, read disjunctively
    pub conclusions: FormulaList,
}

impl Sequent {
    pub fn new(premises: FormulaList, conclusions: FormulaList) -> Sequent {
        Sequent {
            premises,
            conclusions,
        }
    }
    /// Decide validity with a tableau that has no resource limits.
    pub fn is_valid(&self) -> bool {
        match Tableau::new().decide(self) {
            Ok(valid) => valid,
            // Only limits can make decide() fail.
            Err(_) => unreachable(),
        }
    }
    /// Returns the total number of formula nodes on both sides.
    pub fn size(&self) -> usize {
        self.premises
            .iter()
            .chain(self.conclusions.iter())
            .map(Formula::size)
            .sum()
    }
}

/// Decide whether `premises` entail (at least one of) `conclusions`.
pub fn check_sequent(premises: &[Formula], conclusions: &[Formula]) -> bool {
    Sequent::new(
        premises.iter().cloned().collect(),
        conclusions.iter().cloned().collect(),
    )
    .is_valid()
}

/// Write a comma-separated list of formulas.
fn write_list(f: &mut fmt::Formatter, formulas: &FormulaList) -> fmt::Result {
    for (i, formula) in formulas.iter().enumerate() {
        if i != 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", formula)?;
    }
    Ok(())
}

/// Prints in the notation accepted by [parse_sequent](../parser/fn.parse_sequent.html).
impl fmt::Display for Sequent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_list(f, &self.premises)?;
        write!(f, "{}|=", if self.premises.is_empty() { "" } else { " " })?;
        if !self.conclusions.is_empty() {
            write!(f, " ")?;
        }
        write_list(f, &self.conclusions)
    }
}
