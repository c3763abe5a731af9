//! Static symbol-to-continuous-contract mapping.

use crate::domain::Symbol;

/// CME Globex MDP 3.0 dataset identifier.
pub const DATASET: &str = "GLBX.MDP3";

/// Input symbology for continuous-contract requests.
pub const STYPE_CONTINUOUS: &str = "continuous";

/// Logical futures roots and their front-month continuous notation.
const CONTINUOUS_CONTRACTS: &[(&str, &str)] = &[
    ("ES", "ES.c.0"),
    ("NQ", "NQ.c.0"),
    ("YM", "YM.c.0"),
    ("RTY", "RTY.c.0"),
    ("CL", "CL.c.0"),
    ("NG", "NG.c.0"),
    ("GC", "GC.c.0"),
    ("SI", "SI.c.0"),
    ("HG", "HG.c.0"),
    ("ZB", "ZB.c.0"),
    ("ZN", "ZN.c.0"),
    ("ZF", "ZF.c.0"),
    ("6E", "6E.c.0"),
    ("6B", "6B.c.0"),
    ("6J", "6J.c.0"),
];

/// Resolve a logical symbol to the venue's continuous-contract notation.
///
/// Roots outside the table resolve by formatting `<ROOT>.c.0`.
pub fn continuous_contract(symbol: &Symbol) -> String {
    CONTINUOUS_CONTRACTS
        .iter()
        .find(|(root, _)| *root == symbol.as_str())
        .map(|(_, contract)| (*contract).to_owned())
        .unwrap_or_else(|| format!("{}.c.0", symbol.as_str()))
}
