//! Semantic tableau decision procedure for sequents
//!
//! A sequent is decomposed into branches. Each branch holds the formulas
//! that still need to be decomposed on either side, plus the atoms that
//! were already found to be true on either side. Decomposition follows the
//! shape of the formula:
//!
//! | formula   | premise side                | conclusion side             |
//! |-----------|-----------------------------|-----------------------------|
//! | atom      | record in premise atoms     | record in conclusion atoms  |
//! | falsum    | branch is closed            | dropped                     |
//! | `~U`      | `U` becomes a conclusion    | `U` becomes a premise       |
//! | `U & V`   | both become premises        | split: `U` in one branch, `V` in the other |
//! | `U \| V`  | split: `U` in one branch, `V` in the other | both become conclusions |
//!
//! Premises are always decomposed before conclusions. A branch with nothing
//! left to decompose is closed iff some atom is true on both sides. The
//! sequent is valid iff every branch is closed.
//!
//! Every step removes one formula node from the work lists, so the number
//! of steps per branch is bounded by the size of the sequent.

use crate::{
    formula::{Atom, Formula},
    memory::{HeapSpace, Vector},
    sequent::Sequent,
};
use sequent_macros::HeapSpace;
use std::fmt;

/// Optional resource ceilings for untrusted input
///
/// Hitting a limit leaves the verdict undetermined; it never means "not valid".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    /// The maximum total number of formula nodes in a sequent
    pub max_formula_nodes: Option<usize>,
    /// The maximum number of branches the tableau may open
    pub max_branches: Option<usize>,
}

/// Resource exhaustion while deciding a sequent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableauError {
    /// The sequent is larger than [Limits::max_formula_nodes](struct.Limits.html#structfield.max_formula_nodes).
    FormulaTooLarge { nodes: usize, limit: usize },
    /// The tableau needed more than [Limits::max_branches](struct.Limits.html#structfield.max_branches).
    TooManyBranches { limit: usize },
}

impl fmt::Display for TableauError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableauError::FormulaTooLarge { nodes, limit } => write!(
                f,
                "sequent has {} formula nodes, exceeding the limit of {}",
                nodes, limit
            ),
            TableauError::TooManyBranches { limit } => {
                write!(f, "tableau exceeded the limit of {} branches", limit)
            }
        }
    }
}

impl std::error::Error for TableauError {}

/// Counters describing the work done by [decide](struct.Tableau.html#method.decide)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    /// Branches that were started, including the initial one
    pub branches: usize,
    /// Branches that were closed
    pub closed_branches: usize,
    /// Premise disjunctions and conclusion conjunctions that were split
    pub splits: usize,
    /// Formulas that were decomposed
    pub steps: usize,
    /// The highest number of branches waiting to be explored at the same time
    pub max_pending: usize,
}

impl Statistics {
    /// Add the counters of another run to these.
    pub fn accumulate(&mut self, other: &Statistics) {
        self.branches += other.branches;
        self.closed_branches += other.closed_branches;
        self.splits += other.splits;
        self.steps += other.steps;
        self.max_pending = self.max_pending.max(other.max_pending);
    }
}

/// A set of atoms, kept as sorted vector without duplicates
#[derive(Debug, Clone, PartialEq, Eq, Default, HeapSpace)]
pub struct AtomSet(Vector<Atom>);

impl AtomSet {
    pub fn new() -> AtomSet {
        AtomSet(Vector::new())
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn contains(&self, atom: Atom) -> bool {
        self.0.binary_search(&atom).is_ok()
    }
    /// Add an atom, returning false if it was already present.
    pub fn insert(&mut self, atom: Atom) -> bool {
        let inserted = match self.0.binary_search(&atom) {
            Ok(_) => false,
            Err(position) => {
                self.0.insert(position, atom);
                true
            }
        };
        self.check_invariants();
        inserted
    }
    /// Returns the smallest atom contained in both sets.
    pub fn first_common(&self, other: &AtomSet) -> Option<Atom> {
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let (left, right) = (self.0[i], other.0[j]);
            if left == right {
                return Some(left);
            } else if left < right {
                i += 1;
            } else {
                j += 1;
            }
        }
        None
    }
    pub fn intersects(&self, other: &AtomSet) -> bool {
        self.first_common(other).is_some()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.0.iter()
    }
    /// Check that the atoms are strictly increasing (expensive).
    fn check_invariants(&self) {
        if !crate::config::CHECK_ATOM_SET_INVARIANTS {
            return;
        }
        for i in 1..self.0.len() {
            invariant!(self.0[i - 1] < self.0[i]);
        }
    }
}

impl fmt::Display for AtomSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, atom) in self.iter().enumerate() {
            write!(f, "{}{}", if i == 0 { "" } else { ", " }, atom)?;
        }
        write!(f, "}}")
    }
}

/// The decomposition state of one branch
///
/// The work lists are stacks: the formula at the end is decomposed next.
/// Formulas are borrowed from the sequent that is being decided.
#[derive(Debug, Clone)]
struct Branch<'a> {
    /// Formulas still to be decomposed on the premise side
    premises: Vector<&'a Formula>,
    /// Formulas still to be decomposed on the conclusion side
    conclusions: Vector<&'a Formula>,
    /// Atoms that are true on the premise side
    premise_atoms: AtomSet,
    /// Atoms that are true on the conclusion side
    conclusion_atoms: AtomSet,
    /// The number of splits between the root and this branch
    depth: usize,
}

impl<'a> Branch<'a> {
    /// The branch containing the whole sequent.
    fn root(sequent: &'a Sequent) -> Branch<'a> {
        Branch {
            premises: sequent.premises.iter().rev().collect(),
            conclusions: sequent.conclusions.iter().rev().collect(),
            premise_atoms: AtomSet::new(),
            conclusion_atoms: AtomSet::new(),
            depth: 0,
        }
    }
}

/// How a branch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closure {
    /// Falsum was found among the premises.
    Falsum,
    /// This atom is true on both sides.
    Atom(Atom),
    /// No closure condition holds: the branch describes a counter-model.
    Open,
}

/// The decision procedure
///
/// Branches are explored depth-first using an explicit stack of pending
/// branches, so splits do not deepen the Rust call stack.
#[derive(Debug, Clone, Default)]
pub struct Tableau {
    /// Resource ceilings; none by default
    pub limits: Limits,
    /// 0: silent, 1: print splits and branch verdicts, 2: print every step
    pub verbosity: u64,
    /// Counters for the last call to [decide](#method.decide)
    pub statistics: Statistics,
}

impl Tableau {
    /// Create a tableau without limits that does not log anything.
    pub fn new() -> Tableau {
        Tableau::default()
    }
    /// Create a tableau with the given limits.
    pub fn with_limits(limits: Limits) -> Tableau {
        Tableau {
            limits,
            ..Tableau::default()
        }
    }

    /// Decide whether a sequent is valid.
    ///
    /// Returns an error only if a configured limit was exceeded.
    pub fn decide(&mut self, sequent: &Sequent) -> Result<bool, TableauError> {
        self.statistics = Statistics::default();
        if let Some(limit) = self.limits.max_formula_nodes {
            let nodes = sequent.size();
            if nodes > limit {
                return Err(TableauError::FormulaTooLarge { nodes, limit });
            }
        }
        let mut pending: Vector<Branch> = vector!(Branch::root(sequent));
        while let Some(branch) = pending.pop() {
            self.statistics.branches += 1;
            if let Some(limit) = self.limits.max_branches {
                if self.statistics.branches > limit {
                    return Err(TableauError::TooManyBranches { limit });
                }
            }
            let depth = branch.depth;
            match self.expand(branch, &mut pending) {
                Closure::Falsum => {
                    log!(self, 1, "branch at depth {} closed by falsum", depth);
                }
                Closure::Atom(atom) => {
                    log!(self, 1, "branch at depth {} closed by {}", depth, atom);
                }
                Closure::Open => {
                    log!(self, 1, "branch at depth {} is open", depth);
                    return Ok(false);
                }
            }
            self.statistics.closed_branches += 1;
        }
        Ok(true)
    }

    /// Decompose a branch until it is closed or open.
    ///
    /// When the branch splits, it continues with the left alternative and
    /// pushes the right alternative onto `pending`.
    fn expand<'a>(&mut self, mut branch: Branch<'a>, pending: &mut Vector<Branch<'a>>) -> Closure {
        loop {
            if let Some(formula) = branch.premises.pop() {
                self.statistics.steps += 1;
                log!(self, 2, "premise: {}", formula);
                match formula {
                    Formula::Atom(atom) => {
                        branch.premise_atoms.insert(*atom);
                    }
                    Formula::Falsum => return Closure::Falsum,
                    Formula::Not(u) => branch.conclusions.push(u),
                    Formula::And(u, v) => {
                        branch.premises.push(v);
                        branch.premises.push(u);
                    }
                    Formula::Or(u, v) => {
                        log!(self, 1, "split premise {}", formula);
                        let mut right = self.split(&mut branch);
                        right.premises.push(v);
                        branch.premises.push(u);
                        self.defer(right, pending);
                    }
                }
            } else if let Some(formula) = branch.conclusions.pop() {
                self.statistics.steps += 1;
                log!(self, 2, "conclusion: {}", formula);
                match formula {
                    Formula::Atom(atom) => {
                        branch.conclusion_atoms.insert(*atom);
                    }
                    Formula::Falsum => (),
                    Formula::Not(u) => branch.premises.push(u),
                    Formula::And(u, v) => {
                        log!(self, 1, "split conclusion {}", formula);
                        let mut right = self.split(&mut branch);
                        right.conclusions.push(v);
                        branch.conclusions.push(u);
                        self.defer(right, pending);
                    }
                    Formula::Or(u, v) => {
                        branch.conclusions.push(v);
                        branch.conclusions.push(u);
                    }
                }
            } else {
                log!(
                    self,
                    2,
                    "atomic sequent: {} |= {}",
                    branch.premise_atoms,
                    branch.conclusion_atoms
                );
                return match branch.premise_atoms.first_common(&branch.conclusion_atoms) {
                    Some(atom) => Closure::Atom(atom),
                    None => Closure::Open,
                };
            }
        }
    }

    /// Deepen `branch` by one split and return a copy for the other alternative.
    fn split<'a>(&mut self, branch: &mut Branch<'a>) -> Branch<'a> {
        self.statistics.splits += 1;
        branch.depth += 1;
        branch.clone()
    }

    /// Queue a branch for later exploration.
    fn defer<'a>(&mut self, branch: Branch<'a>, pending: &mut Vector<Branch<'a>>) {
        pending.push(branch);
        self.statistics.max_pending = self.statistics.max_pending.max(pending.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequent::check_sequent;

    fn letter(name: char) -> Formula {
        Formula::atom(Atom::letter(name))
    }

    macro_rules! formulas {
        ($($x:expr),*) => (vec!($($x.clone()),*));
    }

    /// Evaluate a formula under the assignment whose bit `i` is the value of atom `i`.
    fn evaluate(formula: &Formula, assignment: u32) -> bool {
        match formula {
            Formula::Atom(atom) => assignment & (1 << atom.id()) != 0,
            Formula::Falsum => false,
            Formula::Not(u) => !evaluate(u, assignment),
            Formula::And(u, v) => evaluate(u, assignment) && evaluate(v, assignment),
            Formula::Or(u, v) => evaluate(u, assignment) || evaluate(v, assignment),
        }
    }

    /// Decide a sequent over atoms `A`, `B`, ... by enumerating assignments.
    fn valid_by_truth_table(premises: &[Formula], conclusions: &[Formula], atoms: u32) -> bool {
        (0..1u32 << atoms).all(|assignment| {
            !premises.iter().all(|p| evaluate(p, assignment))
                || conclusions.iter().any(|c| evaluate(c, assignment))
        })
    }

    /// All formulas over `A`, `B` and falsum up to the given nesting depth.
    fn all_formulas(depth: usize) -> Vec<Formula> {
        let mut result = formulas!(letter('A'), letter('B'), Formula::falsum());
        for _ in 0..depth {
            let smaller = result.clone();
            for u in &smaller {
                result.push(!u.clone());
                for v in &smaller {
                    result.push(u.clone() & v.clone());
                    result.push(u.clone() | v.clone());
                }
            }
        }
        result
    }

    #[test]
    fn agrees_with_truth_tables_on_single_formulas() {
        for formula in all_formulas(2) {
            let one = [formula];
            assert_eq!(
                check_sequent(&[], &one),
                valid_by_truth_table(&[], &one, 2),
                "|= {}",
                one[0]
            );
            assert_eq!(
                check_sequent(&one, &[]),
                valid_by_truth_table(&one, &[], 2),
                "{} |=",
                one[0]
            );
        }
    }

    #[test]
    fn agrees_with_truth_tables_on_pairs() {
        let formulas = all_formulas(1);
        for x in &formulas {
            for y in &formulas {
                let (x, y) = ([x.clone()], [y.clone()]);
                assert_eq!(
                    check_sequent(&x, &y),
                    valid_by_truth_table(&x, &y, 2),
                    "{} |= {}",
                    x[0],
                    y[0]
                );
            }
        }
    }

    #[test]
    fn reflexivity() {
        for x in all_formulas(1) {
            assert!(check_sequent(&[x.clone()], &[x]));
        }
    }

    #[test]
    fn monotonicity() {
        let (p, q) = (letter('P'), letter('Q'));
        let premises = formulas!(p, Formula::implies(p.clone(), q.clone()));
        let conclusions = formulas!(q);
        assert!(check_sequent(&premises, &conclusions));
        for y in all_formulas(1) {
            let mut more_premises = premises.clone();
            more_premises.push(y.clone());
            assert!(check_sequent(&more_premises, &conclusions));
            let mut more_conclusions = conclusions.clone();
            more_conclusions.push(y);
            assert!(check_sequent(&premises, &more_conclusions));
        }
    }

    #[test]
    fn negation_moves_formulas_across() {
        let (p, q) = (letter('A'), letter('B'));
        let contexts = [
            (formulas!(), formulas!()),
            (formulas!(p), formulas!()),
            (formulas!(), formulas!(q)),
            (formulas!(p.clone() | q.clone()), formulas!(p.clone() & q.clone())),
        ];
        for (premises, conclusions) in contexts.iter() {
            for x in all_formulas(1) {
                let mut with_negation = premises.clone();
                with_negation.push(!x.clone());
                let mut with_conclusion = conclusions.clone();
                with_conclusion.push(x);
                assert_eq!(
                    check_sequent(&with_negation, conclusions),
                    check_sequent(premises, &with_conclusion)
                );
            }
        }
    }

    #[test]
    fn falsum_premise_closes_everything() {
        for x in all_formulas(1) {
            assert!(check_sequent(&[Formula::falsum(), x.clone()], &[]));
            assert!(check_sequent(&[Formula::falsum()], &[x]));
        }
        assert!(!check_sequent(&[], &[Formula::falsum()]));
    }

    #[test]
    fn contradictory_premises_need_no_conclusion() {
        let p = letter('P');
        assert!(check_sequent(&[p.clone(), !p.clone()], &[]));
        assert!(!check_sequent(&[p], &[]));
        assert!(!check_sequent(&[], &[]));
    }

    #[test]
    fn fallacies_are_rejected() {
        let (p, q) = (letter('P'), letter('Q'));
        let p_implies_q = Formula::implies(p.clone(), q.clone());
        // Modus ponens, with the premises in either order.
        assert!(check_sequent(&formulas!(p_implies_q, p), &formulas!(q)));
        assert!(check_sequent(&formulas!(p, p_implies_q), &formulas!(q)));
        // Affirming the consequent.
        assert!(!check_sequent(&formulas!(p_implies_q, q), &formulas!(p)));
        // Denying the antecedent.
        assert!(!check_sequent(&formulas!(p_implies_q, !p.clone()), &formulas!(!q.clone())));
        // Illicit commutativity.
        assert!(!check_sequent(
            &formulas!(p_implies_q),
            &formulas!(Formula::implies(q, p))
        ));
    }

    #[test]
    fn de_morgan() {
        let (p, q) = (letter('P'), letter('Q'));
        let not_and = !(p.clone() & q.clone());
        let or_not = !p.clone() | !q.clone();
        assert!(check_sequent(&formulas!(not_and), &formulas!(or_not)));
        assert!(check_sequent(&formulas!(or_not), &formulas!(not_and)));
        let not_or = !(p.clone() | q.clone());
        let and_not = !p.clone() & !q.clone();
        assert!(check_sequent(&formulas!(not_or), &formulas!(and_not)));
        assert!(check_sequent(&formulas!(and_not), &formulas!(not_or)));
        // Distributing the negation without swapping the connective is wrong.
        assert!(!check_sequent(&formulas!(!p | !q), &formulas!(not_or)));
    }

    #[test]
    fn verdict_and_statistics_are_reproducible() {
        let (p, q, r) = (letter('P'), letter('Q'), letter('R'));
        let sequent = Sequent::new(
            vector!((p.clone() | q.clone()) & (p.clone() | r.clone())),
            vector!(p | (q & r)),
        );
        let mut tableau = Tableau::new();
        assert_eq!(tableau.decide(&sequent), Ok(true));
        let first = tableau.statistics;
        assert_eq!(tableau.decide(&sequent), Ok(true));
        assert_eq!(tableau.statistics, first);
        assert_eq!(first.branches, first.closed_branches);
        assert_eq!(first.branches, first.splits + 1);
    }

    #[test]
    fn statistics_of_a_small_tableau() {
        let (p, q) = (letter('P'), letter('Q'));
        // P | Q |= Q | P splits once on the premise side.
        let sequent = Sequent::new(vector!(p.clone() | q.clone()), vector!(q | p));
        let mut tableau = Tableau::new();
        assert_eq!(tableau.decide(&sequent), Ok(true));
        assert_eq!(
            tableau.statistics,
            Statistics {
                branches: 2,
                closed_branches: 2,
                splits: 1,
                // Root: the disjunction, then P, then Q | P, Q, P.
                // Right branch: Q, then Q | P, Q, P.
                steps: 9,
                max_pending: 1,
            }
        );
    }

    #[test]
    fn stops_at_first_open_branch() {
        let (a, b) = (letter('A'), letter('B'));
        // The left branch (A) is open, so the right one is never started.
        let sequent = Sequent::new(vector!(a | b.clone()), vector!(b));
        let mut tableau = Tableau::new();
        assert_eq!(tableau.decide(&sequent), Ok(false));
        assert_eq!(tableau.statistics.branches, 1);
        assert_eq!(tableau.statistics.closed_branches, 0);
    }

    #[test]
    fn node_limit_is_not_a_verdict() {
        let p = letter('P');
        let sequent = Sequent::new(vector!(p.clone() & p.clone()), vector!(p));
        let mut tableau = Tableau::with_limits(Limits {
            max_formula_nodes: Some(3),
            max_branches: None,
        });
        assert_eq!(
            tableau.decide(&sequent),
            Err(TableauError::FormulaTooLarge { nodes: 4, limit: 3 })
        );
        tableau.limits.max_formula_nodes = Some(4);
        assert_eq!(tableau.decide(&sequent), Ok(true));
    }

    #[test]
    fn branch_limit_is_not_a_verdict() {
        // (P0 | P1), ..., (P6 | P7) |= P0, ..., P7 closes all 16 branches.
        let valid = Sequent::new(
            (0..4)
                .map(|i| {
                    Formula::atom(Atom::numbered(2 * i)) | Formula::atom(Atom::numbered(2 * i + 1))
                })
                .collect(),
            (0..8).map(|i| Formula::atom(Atom::numbered(i))).collect(),
        );
        let mut tableau = Tableau::new();
        assert_eq!(tableau.decide(&valid), Ok(true));
        assert_eq!(tableau.statistics.branches, 16);
        assert_eq!(tableau.statistics.splits, 15);
        tableau.limits.max_branches = Some(15);
        assert_eq!(
            tableau.decide(&valid),
            Err(TableauError::TooManyBranches { limit: 15 })
        );
        tableau.limits.max_branches = Some(16);
        assert_eq!(tableau.decide(&valid), Ok(true));
    }

    #[test]
    fn atom_set() {
        let mut left = AtomSet::new();
        assert!(left.insert(Atom(3)));
        assert!(left.insert(Atom(1)));
        assert!(!left.insert(Atom(3)));
        assert_eq!(left.len(), 2);
        assert!(left.contains(Atom(1)));
        assert!(!left.contains(Atom(2)));
        let mut right = AtomSet::new();
        right.insert(Atom(2));
        assert!(!left.intersects(&right));
        right.insert(Atom(3));
        right.insert(Atom(1));
        assert_eq!(left.first_common(&right), Some(Atom(1)));
        assert_eq!(format!("{}", right), "{B, C, D}");
    }

    #[test]
    fn long_conjunction_chain() {
        // P & P & ... & P, nested to the left the way the parser builds chains.
        let p = letter('P');
        let mut formula = p.clone();
        for _ in 0..100_000 {
            formula = formula & p.clone();
        }
        let sequent = Sequent::new(vector!(formula), vector!(p));
        assert_eq!(sequent.size(), 200_002);
        let mut tableau = Tableau::with_limits(Limits {
            max_formula_nodes: Some(200_001),
            max_branches: None,
        });
        assert_eq!(
            tableau.decide(&sequent),
            Err(TableauError::FormulaTooLarge {
                nodes: 200_002,
                limit: 200_001
            })
        );
        tableau.limits = Limits::default();
        assert_eq!(tableau.decide(&sequent), Ok(true));
        assert_eq!(tableau.statistics.splits, 0);
        drop(sequent);
    }
}
