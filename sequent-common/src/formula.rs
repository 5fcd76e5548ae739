//! Propositional formulas over atoms, falsum, negation, conjunction and disjunction

use crate::memory::{HeapSpace, Vector};
use static_assertions::const_assert;
use std::{
    fmt,
    mem::{self, size_of},
    ops::{BitAnd, BitOr, Not},
};

/// An atomic proposition (sentence letter)
///
/// Two atoms denote the same proposition iff their identifiers are equal.
/// The first 26 identifiers are printed as the letters `A` to `Z`; all
/// others as `P0`, `P1`, and so on.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
pub struct Atom(pub u32);

impl Atom {
    /// The number of atoms that have a single-letter name.
    pub const LETTERS: u32 = 26;
    /// The largest identifier an atom may have.
    pub const MAX_ID: u32 = u32::max_value() - 1;

    /// Create the atom with the given identifier.
    /// # Panics
    /// Panics if the identifier exceeds [MAX_ID](#associatedconstant.MAX_ID).
    pub fn new(id: u32) -> Atom {
        requires!(id <= Atom::MAX_ID);
        Atom(id)
    }
    /// Returns the atom named by an uppercase letter.
    /// # Panics
    /// Panics if `letter` is not in `'A'..='Z'`.
    pub fn letter(letter: char) -> Atom {
        requires!(letter.is_ascii_uppercase());
        Atom::new(letter as u32 - 'A' as u32)
    }
    /// Returns the atom `Pn` from the numbered series that follows `Z`.
    pub fn numbered(n: u32) -> Atom {
        requires!(n <= Atom::MAX_ID - Atom::LETTERS);
        Atom::new(Atom::LETTERS + n)
    }
    /// Look up an atom by its printed name, for example `"Q"` or `"P12"`.
    pub fn from_name(name: &str) -> Option<Atom> {
        let bytes = name.as_bytes();
        match bytes {
            [letter] if letter.is_ascii_uppercase() => Some(Atom::letter(*letter as char)),
            [b'P', digits @ ..] if !digits.is_empty() && digits.iter().all(u8::is_ascii_digit) => {
                name[1..]
                    .parse::<u32>()
                    .ok()
                    .filter(|&n| n <= Atom::MAX_ID - Atom::LETTERS)
                    .map(Atom::numbered)
            }
            _ => None,
        }
    }
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 < Atom::LETTERS {
            write!(f, "{}", (b'A' + self.0 as u8) as char)
        } else {
            write!(f, "P{}", self.0 - Atom::LETTERS)
        }
    }
}

/// A propositional formula
///
/// Formulas are finite trees and are never modified after construction.
/// Implication and the biconditional are not variants: they are unfolded
/// into negation, conjunction and disjunction by
/// [implies](#method.implies) and [iff](#method.iff).
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Formula {
    Atom(Atom),
    /// The constant that is false under every assignment
    Falsum,
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
}

// Formula nodes are copied into boxes often enough that we want them small.
const_assert!(size_of::<Formula>() <= 3 * size_of::<usize>());

impl Formula {
    pub fn atom(atom: Atom) -> Formula {
        Formula::Atom(atom)
    }
    pub fn falsum() -> Formula {
        Formula::Falsum
    }
    pub fn negate(u: Formula) -> Formula {
        Formula::Not(Box::new(u))
    }
    pub fn and(u: Formula, v: Formula) -> Formula {
        Formula::And(Box::new(u), Box::new(v))
    }
    pub fn or(u: Formula, v: Formula) -> Formula {
        Formula::Or(Box::new(u), Box::new(v))
    }
    /// `u -> v`, represented as `~u | v`.
    pub fn implies(u: Formula, v: Formula) -> Formula {
        Formula::or(Formula::negate(u), v)
    }
    /// `u <-> v`, represented as `(u -> v) & (v -> u)`.
    pub fn iff(u: Formula, v: Formula) -> Formula {
        Formula::and(
            Formula::implies(u.clone(), v.clone()),
            Formula::implies(v, u),
        )
    }

    /// Returns the number of nodes in this formula.
    ///
    /// This is the measure that every tableau step strictly decreases.
    pub fn size(&self) -> usize {
        self.subformulas().count()
    }
    /// Returns the length of the longest path from the root to a leaf, counting nodes.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vector!((self, 1));
        while let Some((formula, level)) = stack.pop() {
            depth = depth.max(level);
            match formula {
                Formula::Atom(_) | Formula::Falsum => (),
                Formula::Not(u) => stack.push((&**u, level + 1)),
                Formula::And(u, v) | Formula::Or(u, v) => {
                    stack.push((&**u, level + 1));
                    stack.push((&**v, level + 1));
                }
            }
        }
        depth
    }
    /// Returns the atoms occurring in this formula, sorted and without duplicates.
    pub fn atoms(&self) -> Vector<Atom> {
        let mut atoms: Vector<Atom> = self
            .subformulas()
            .filter_map(|formula| match formula {
                Formula::Atom(atom) => Some(*atom),
                _ => None,
            })
            .collect();
        atoms.sort_unstable();
        let mut unique: Vector<Atom> = Vector::with_capacity(atoms.len());
        for atom in atoms {
            if unique.is_empty() || *unique.last() != atom {
                unique.push(atom);
            }
        }
        unique
    }
    /// Iterate over all nodes of this formula in pre-order.
    ///
    /// This uses an explicit stack, so arbitrarily deep formulas are fine.
    pub fn subformulas(&self) -> Subformulas {
        Subformulas {
            stack: vector!(self),
        }
    }
    /// Move the composite children into `stack`, leaving falsum in their place.
    fn detach_children(&mut self, stack: &mut Vector<Formula>) {
        fn detach(child: &mut Formula, stack: &mut Vector<Formula>) {
            if let Formula::Not(_) | Formula::And(..) | Formula::Or(..) = child {
                stack.push(mem::replace(child, Formula::Falsum));
            }
        }
        match self {
            Formula::Atom(_) | Formula::Falsum => (),
            Formula::Not(u) => detach(u, stack),
            Formula::And(u, v) | Formula::Or(u, v) => {
                detach(u, stack);
                detach(v, stack);
            }
        }
    }
    /// Binding strength used for printing; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Formula::Or(..) => 1,
            Formula::And(..) => 2,
            Formula::Not(_) => 3,
            Formula::Atom(_) | Formula::Falsum => 4,
        }
    }
    /// Write `child`, parenthesized if it binds weaker than `parent_precedence`.
    fn fmt_operand(
        f: &mut fmt::Formatter,
        child: &Formula,
        parent_precedence: u8,
    ) -> fmt::Result {
        if child.precedence() < parent_precedence {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }
}

/// Prints in the notation accepted by the [parser](../parser/index.html).
///
/// Conjunction and disjunction are printed left-associatively, so a right-nested
/// chain keeps its parentheses.
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Formula::Atom(atom) => write!(f, "{}", atom),
            Formula::Falsum => write!(f, "falsum"),
            Formula::Not(u) => {
                write!(f, "~")?;
                Formula::fmt_operand(f, u, self.precedence())
            }
            Formula::And(u, v) | Formula::Or(u, v) => {
                let operator = if let Formula::And(..) = self { "&" } else { "|" };
                Formula::fmt_operand(f, u, self.precedence())?;
                write!(f, " {} ", operator)?;
                Formula::fmt_operand(f, v, self.precedence() + 1)
            }
        }
    }
}

impl HeapSpace for Formula {
    fn heap_space(&self) -> usize {
        self.subformulas()
            .map(|formula| match formula {
                Formula::Atom(_) | Formula::Falsum => 0,
                Formula::Not(_) => size_of::<Formula>(),
                Formula::And(..) | Formula::Or(..) => 2 * size_of::<Formula>(),
            })
            .sum()
    }
}

/// The default drop would recurse once per level.
impl Drop for Formula {
    fn drop(&mut self) {
        let mut stack = Vector::new();
        self.detach_children(&mut stack);
        while let Some(mut formula) = stack.pop() {
            formula.detach_children(&mut stack);
        }
    }
}

/// Iterator returned by [Formula::subformulas](enum.Formula.html#method.subformulas)
pub struct Subformulas<'a> {
    stack: Vector<&'a Formula>,
}

impl<'a> Iterator for Subformulas<'a> {
    type Item = &'a Formula;
    fn next(&mut self) -> Option<&'a Formula> {
        let formula = self.stack.pop()?;
        match formula {
            Formula::Atom(_) | Formula::Falsum => (),
            Formula::Not(u) => self.stack.push(u),
            Formula::And(u, v) | Formula::Or(u, v) => {
                self.stack.push(v);
                self.stack.push(u);
            }
        }
        Some(formula)
    }
}

impl From<Atom> for Formula {
    fn from(atom: Atom) -> Formula {
        Formula::Atom(atom)
    }
}

impl Not for Formula {
    type Output = Formula;
    fn not(self) -> Formula {
        Formula::negate(self)
    }
}

impl BitAnd for Formula {
    type Output = Formula;
    fn bitand(self, other: Formula) -> Formula {
        Formula::and(self, other)
    }
}

impl BitOr for Formula {
    type Output = Formula;
    fn bitor(self, other: Formula) -> Formula {
        Formula::or(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(name: char) -> Formula {
        Formula::atom(Atom::letter(name))
    }

    #[test]
    fn atom_names() {
        assert_eq!(Atom::letter('A'), Atom(0));
        assert_eq!(Atom::letter('Z'), Atom(25));
        assert_eq!(Atom::numbered(0), Atom(26));
        assert_eq!(format!("{}", Atom(15)), "P");
        assert_eq!(format!("{}", Atom(26 + 12)), "P12");
        assert_eq!(Atom::from_name("Q"), Some(Atom(16)));
        assert_eq!(Atom::from_name("P12"), Some(Atom(38)));
        assert_eq!(Atom::from_name("P"), Some(Atom(15)));
        assert_eq!(Atom::from_name("q"), None);
        assert_eq!(Atom::from_name("P1x"), None);
        assert_eq!(Atom::from_name("QQ"), None);
        assert_eq!(Atom::from_name(""), None);
        assert_eq!(Atom::from_name("P99999999999"), None);
    }

    #[test]
    fn derived_connectives_are_unfolded() {
        let (p, q) = (letter('P'), letter('Q'));
        assert_eq!(
            Formula::implies(p.clone(), q.clone()),
            Formula::Or(Box::new(Formula::Not(Box::new(p.clone()))), Box::new(q.clone()))
        );
        assert_eq!(
            Formula::iff(p.clone(), q.clone()),
            (!p.clone() | q.clone()) & (!q | p)
        );
    }

    #[test]
    fn size_depth_and_atoms() {
        let (p, q) = (letter('P'), letter('Q'));
        let formula = Formula::iff(p, q.clone()) | Formula::falsum();
        assert_eq!(formula.size(), 11);
        assert_eq!(formula.depth(), 5);
        assert_eq!(formula.atoms(), vector!(Atom::letter('P'), Atom::letter('Q')));
        assert_eq!(Formula::falsum().atoms(), Vector::new());
        assert_eq!(q.size(), 1);
    }

    #[test]
    fn display_uses_minimal_parentheses() {
        let (p, q, r) = (letter('P'), letter('Q'), letter('R'));
        assert_eq!(format!("{}", !(p.clone() & q.clone())), "~(P & Q)");
        assert_eq!(format!("{}", !p.clone() | q.clone()), "~P | Q");
        assert_eq!(
            format!("{}", (p.clone() | q.clone()) & r.clone()),
            "(P | Q) & R"
        );
        assert_eq!(format!("{}", p.clone() & q.clone() & r.clone()), "P & Q & R");
        assert_eq!(format!("{}", p.clone() & (q.clone() & r.clone())), "P & (Q & R)");
        assert_eq!(format!("{}", p | q & r), "P | Q & R");
        assert_eq!(format!("{}", !!Formula::falsum()), "~~falsum");
    }

    #[test]
    fn heap_space_counts_boxes() {
        let formula = !(letter('A') & letter('B'));
        assert_eq!(formula.heap_space(), 3 * size_of::<Formula>());
        assert_eq!(letter('A').heap_space(), 0);
    }

    #[test]
    fn deep_formulas_are_traversed_without_recursion() {
        let mut negations = letter('P');
        for _ in 0..1_000_000 {
            negations = !negations;
        }
        assert_eq!(negations.size(), 1_000_001);
        assert_eq!(negations.depth(), 1_000_001);
        assert_eq!(negations.atoms(), vector!(Atom::letter('P')));
        drop(negations);
        let mut chain = letter('A');
        for i in 0..100_000 {
            chain = chain | Formula::atom(Atom::numbered(i % 3));
        }
        assert_eq!(chain.size(), 200_001);
        assert_eq!(chain.depth(), 100_001);
        assert_eq!(chain.heap_space(), 200_000 * size_of::<Formula>());
        assert_eq!(
            chain.atoms(),
            vector!(Atom::letter('A'), Atom::numbered(0), Atom::numbered(1), Atom::numbered(2))
        );
    }
}
