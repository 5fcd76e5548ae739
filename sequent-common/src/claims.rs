//! Claims documents: sequents together with their expected verdicts
//!
//! ```toml
//! [[claim]]
//! name = "Modus ponens"
//! sequent = "P, P -> Q |= Q"
//! valid = true
//! ```

use crate::{memory::Vector, parser::parse_sequent, sequent::Sequent, tableau::Tableau};
use serde_derive::{Deserialize, Serialize};

/// A claims document.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Claims {
    /// The claims, in the order they were written
    #[serde(default)]
    pub claim: Vector<Claim>,
}

/// The claim that a sequent has a certain verdict
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claim {
    /// A human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The sequent in textual notation
    pub sequent: String,
    /// Whether the sequent is claimed to be valid
    pub valid: bool,
}

impl Claims {
    pub fn new() -> Claims {
        Claims::default()
    }
    /// Record the verdict for a sequent.
    pub fn push(&mut self, sequent: &Sequent, valid: bool) {
        self.claim.push(Claim {
            name: None,
            sequent: format!("{}", sequent),
            valid,
        })
    }
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

impl Claim {
    /// The name if there is one, otherwise the sequent.
    pub fn description(&self) -> &str {
        self.name.as_ref().unwrap_or(&self.sequent)
    }
}

/// Check every claim and print an error message for each one that does not hold.
///
/// Returns true if all claims hold.
pub fn check_claims(claims: &Claims, tableau: &mut Tableau) -> bool {
    let mut failures = 0;
    for (i, claim) in claims.claim.iter().enumerate() {
        match check_claim(claim, tableau) {
            Ok(()) => log!(tableau, 1, "claim {} holds: {}", i + 1, claim.description()),
            Err(why) => {
                warn!("claim {} ({}): {}", i + 1, claim.description(), why);
                failures += 1;
            }
        }
    }
    failures == 0
}

/// Parses and decides a single claim.
/// Returns an error of what went wrong.
fn check_claim(claim: &Claim, tableau: &mut Tableau) -> Result<(), String> {
    let sequent = parse_sequent(&claim.sequent)
        .map_err(|err| format!("cannot parse sequent \"{}\": {}", claim.sequent, err))?;
    let valid = tableau
        .decide(&sequent)
        .map_err(|err| format!("undetermined: {}", err))?;
    if valid != claim.valid {
        return Err(format!(
            "sequent {} is claimed {} but is {}",
            sequent,
            verdict_name(claim.valid),
            verdict_name(valid)
        ));
    }
    Ok(())
}

fn verdict_name(valid: bool) -> &'static str {
    if valid {
        "valid"
    } else {
        "invalid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tableau::Limits;

    const LAWS: &str = include_str!("../laws.toml");

    fn parse_claims(text: &str) -> Claims {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn bundled_laws_hold() {
        let claims = parse_claims(LAWS);
        assert_eq!(claims.claim.len(), 46);
        assert_eq!(claims.claim.iter().filter(|claim| !claim.valid).count(), 5);
        assert!(check_claims(&claims, &mut Tableau::new()));
    }

    #[test]
    fn each_law_is_checked_individually() {
        let claims = parse_claims(LAWS);
        let mut tableau = Tableau::new();
        for claim in &claims.claim {
            assert_eq!(check_claim(claim, &mut tableau), Ok(()), "{}", claim.description());
            let flipped = Claim {
                valid: !claim.valid,
                ..claim.clone()
            };
            assert!(check_claim(&flipped, &mut tableau).is_err());
        }
    }

    #[test]
    fn failures_are_explained() {
        let mut tableau = Tableau::new();
        let wrong = Claim {
            name: Some("Affirming the consequent".to_string()),
            sequent: "P -> Q, Q |= P".to_string(),
            valid: true,
        };
        assert_eq!(
            check_claim(&wrong, &mut tableau),
            Err("sequent ~P | Q, Q |= P is claimed valid but is invalid".to_string())
        );
        let garbled = Claim {
            name: None,
            sequent: "P |= (Q".to_string(),
            valid: true,
        };
        assert_eq!(garbled.description(), "P |= (Q");
        assert_eq!(
            check_claim(&garbled, &mut tableau),
            Err("cannot parse sequent \"P |= (Q\": expected \")\" at line 1 column 8".to_string())
        );
        let mut limited = Tableau::with_limits(Limits {
            max_formula_nodes: Some(1),
            ..Limits::default()
        });
        assert!(check_claim(&wrong, &mut limited)
            .unwrap_err()
            .starts_with("undetermined: "));
        assert!(!check_claims(
            &Claims {
                claim: vector!(wrong)
            },
            &mut tableau
        ));
    }

    #[test]
    fn written_claims_read_back() {
        let mut claims = Claims::new();
        claims.push(&parse_sequent("P, P -> Q |= Q").unwrap(), true);
        claims.push(&parse_sequent("|= P").unwrap(), false);
        let text = claims.to_toml().unwrap();
        assert!(!text.contains("name"));
        let read = parse_claims(&text);
        assert_eq!(read, claims);
        assert_eq!(read.claim[0].sequent, "P, ~P | Q |= Q");
        assert!(check_claims(&read, &mut Tableau::new()));
        assert_eq!(parse_claims(""), Claims::new());
    }
}
