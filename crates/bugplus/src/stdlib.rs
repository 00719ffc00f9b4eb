//! Arithmetic programs built only from adders.
//!
//! Role names follow one convention: `0_001` is an adder that is never
//! fired, so its output reads 0 but counts as connected; `1_001` is an adder
//! fed by such a zero on input 0 only, so it emits 1, and `-1_001` likewise
//! emits -1. Every other role is `<specification>_<n>`.
//!
//! | id    | in | out | behaviour                                           |
//! |-------|----|-----|-----------------------------------------------------|
//! | `++`  | 1  | 2   | x + 1, exit 1 unless the result is 0                |
//! | `--`  | 1  | 2   | x - 1, exit 1 unless the result is 0                |
//! | `:=`  | 1  | 1   | copies x                                            |
//! | `+++` | 1  | 1   | accumulator seeded from x, +1 per run               |
//! | `---` | 1  | 1   | accumulator seeded from x, -1 per run               |
//! | `==0` | 1  | 2   | exit 1 if x == 0, else exit 0                       |
//! | `\|\|`| 0  | 2   | alternates between its two exits                    |
//! | `?+`  | 1  | 2   | sign test by counting up and down in parallel       |
//! | `-x`  | 1  | 1   | negation                                            |
//! | `-`   | 2  | 2   | x - y                                               |
//! | `==`  | 2  | 2   | equality                                            |
//! | `*`   | 2  | 1   | repeated addition                                   |
//! | `max` | 2  | 2   | larger input                                        |
//! | `min` | 2  | 2   | smaller input                                       |

use crate::error::LibraryError;
use crate::library::Library;
use crate::primitive::ADDER_ID as ADD;
use crate::specification::{ProgramImplementation, Specification};

/// Identifiers installed by [`install_arithmetic`], in dependency order.
pub const ARITHMETIC_IDS: [&str; 14] = [
    "++", "--", ":=", "+++", "---", "==0", "||", "?+", "-x", "-", "==", "*", "max", "min",
];

/// Primitives plus every arithmetic program.
pub fn arithmetic_library() -> Library {
    let mut library = Library::with_primitives();
    // only fails on a duplicate identifier, and the library is fresh
    if let Err(err) = install_arithmetic(&mut library) {
        log::error!("arithmetic library incomplete: {err}");
    }
    library
}

/// Add the arithmetic programs to `library`. Stops at the first identifier
/// already present.
pub fn install_arithmetic(library: &mut Library) -> Result<(), LibraryError> {
    library.add_specification(increment())?;
    library.add_specification(decrement())?;
    library.add_specification(assignment())?;
    library.add_specification(increment_iterator())?;
    library.add_specification(decrement_iterator())?;
    library.add_specification(is_zero())?;
    library.add_specification(pseudo_parallel())?;
    library.add_specification(is_positive())?;
    library.add_specification(change_sign())?;
    library.add_specification(minus())?;
    library.add_specification(compare())?;
    library.add_specification(multiply())?;
    library.add_specification(max())?;
    library.add_specification(min())?;
    Ok(())
}

fn increment() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug(ADD, "1_001")
        .add_data_flow("0_001", "1_001", 0)
        .add_bug(ADD, "+_001")
        .add_data_flow("1_001", "+_001", 1)
        .add_control_flow("1_001", 1, "+_001")
        .connect_control_in_interface("1_001")
        .connect_control_out_interface("+_001", 0, 0)
        .connect_control_out_interface("+_001", 1, 1)
        .connect_data_in_interface("+_001", 0, 0)
        .connect_data_out_interface("+_001");
    Specification::composite("++", 1, 2, p)
}

fn decrement() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug(ADD, "-1_001")
        .add_data_flow("0_001", "-1_001", 1)
        .add_bug(ADD, "+_001")
        .add_data_flow("-1_001", "+_001", 1)
        .add_control_flow("-1_001", 1, "+_001")
        .connect_control_in_interface("-1_001")
        .connect_control_out_interface("+_001", 0, 0)
        .connect_control_out_interface("+_001", 1, 1)
        .connect_data_in_interface("+_001", 0, 0)
        .connect_data_out_interface("+_001");
    Specification::composite("--", 1, 2, p)
}

fn assignment() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug(ADD, "+_001")
        .add_data_flow("0_001", "+_001", 1)
        .connect_control_in_interface("+_001")
        .connect_control_out_interface("+_001", 0, 0)
        .connect_control_out_interface("+_001", 1, 0)
        .connect_data_in_interface("+_001", 0, 0)
        .connect_data_out_interface("+_001");
    Specification::composite(":=", 1, 1, p)
}

fn increment_iterator() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug(ADD, "1_001")
        .add_data_flow("0_001", "1_001", 0)
        .add_bug(ADD, "+_001")
        .add_data_flow("1_001", "+_001", 0)
        .add_data_flow("+_001", "+_001", 1)
        .add_control_flow("1_001", 1, "+_001")
        .connect_control_in_interface("1_001")
        .connect_control_out_interface("+_001", 0, 0)
        .connect_control_out_interface("+_001", 1, 0)
        .connect_data_in_interface("+_001", 1, 0)
        .connect_data_out_interface("+_001");
    Specification::composite("+++", 1, 1, p)
}

fn decrement_iterator() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug(ADD, "1_001")
        .add_data_flow("0_001", "1_001", 1)
        .add_bug(ADD, "+_001")
        .add_data_flow("1_001", "+_001", 0)
        .add_data_flow("+_001", "+_001", 1)
        .add_control_flow("1_001", 1, "+_001")
        .connect_control_in_interface("1_001")
        .connect_control_out_interface("+_001", 0, 0)
        .connect_control_out_interface("+_001", 1, 0)
        .connect_data_in_interface("+_001", 1, 0)
        .connect_data_out_interface("+_001");
    Specification::composite("---", 1, 1, p)
}

fn is_zero() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "+_001")
        .connect_control_in_interface("+_001")
        .connect_data_in_interface("+_001", 0, 0)
        .connect_data_in_interface("+_001", 1, 0)
        .connect_control_out_interface("+_001", 0, 1)
        .connect_control_out_interface("+_001", 1, 0);
    Specification::composite("==0", 1, 2, p)
}

fn pseudo_parallel() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "+_001")
        .add_bug("++", "++_001")
        .add_bug("--", "--_001")
        .add_bug(ADD, "0_001")
        .add_control_flow("+_001", 0, "++_001")
        .add_control_flow("+_001", 1, "--_001")
        .add_data_flow("0_001", "+_001", 0)
        .add_data_flow("++_001", "+_001", 1)
        .add_data_flow("--_001", "++_001", 0)
        .add_data_flow("--_001", "+_001", 1)
        .add_data_flow("++_001", "--_001", 0)
        .connect_control_in_interface("+_001")
        .connect_control_out_interface("++_001", 0, 0)
        .connect_control_out_interface("++_001", 1, 0)
        .connect_control_out_interface("--_001", 0, 1)
        .connect_control_out_interface("--_001", 1, 1);
    Specification::composite("||", 0, 2, p)
}

fn is_positive() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug(ADD, "1_001")
        .add_data_flow("0_001", "1_001", 0)
        .add_control_flow("1_001", 1, "==0_001")
        .add_bug("==0", "==0_001")
        .add_bug(":=", ":=_001")
        .add_data_flow("1_001", ":=_001", 0)
        .add_control_flow("==0_001", 1, ":=_001")
        .add_control_flow("==0_001", 0, ":=_002")
        .add_bug(":=", ":=_002")
        .add_control_flow(":=_002", 0, ":=_003")
        .add_bug(":=", ":=_003")
        .add_control_flow(":=_003", 0, "||_001")
        .add_bug("||", "||_001")
        .add_control_flow("||_001", 0, "++_001")
        .add_control_flow("||_001", 1, "--_001")
        .add_bug("++", "++_001")
        .add_control_flow("++_001", 0, ":=_004")
        .add_control_flow("++_001", 1, "||_001")
        .add_bug("--", "--_001")
        .add_control_flow("--_001", 0, ":=_005")
        .add_control_flow("--_001", 1, "||_001")
        .add_bug(":=", ":=_004")
        .add_bug(":=", ":=_005")
        .add_data_flow(":=_002", "++_001", 0)
        .add_data_flow("++_001", "++_001", 0)
        .add_data_flow(":=_003", "--_001", 0)
        .add_data_flow("--_001", "--_001", 0)
        .add_data_flow("0_001", ":=_004", 0)
        .add_data_flow("1_001", ":=_005", 0)
        .connect_control_in_interface("1_001")
        .connect_data_in_interface("==0_001", 0, 0)
        .connect_data_in_interface(":=_002", 0, 0)
        .connect_data_in_interface(":=_003", 0, 0)
        .connect_data_out_interface(":=_001")
        .connect_data_out_interface(":=_004")
        .connect_data_out_interface(":=_005")
        .connect_control_out_interface(":=_001", 0, 0)
        .connect_control_out_interface(":=_004", 0, 0)
        .connect_control_out_interface(":=_005", 0, 1);
    Specification::composite("?+", 1, 2, p)
}

fn change_sign() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug("==0", "==0_001")
        .add_control_flow("==0_001", 1, ":=_001")
        .add_bug(":=", ":=_001")
        .add_control_flow("==0_001", 0, ":=_004")
        .add_bug(":=", ":=_004")
        .add_control_flow(":=_004", 0, "?+_001")
        .add_bug("?+", "?+_001")
        .add_control_flow("?+_001", 0, ":=_002")
        .add_bug(":=", ":=_002")
        .add_control_flow("?+_001", 1, ":=_003")
        .add_bug(":=", ":=_003")
        .add_control_flow(":=_002", 0, "+++_001")
        .add_bug("+++", "+++_001")
        .add_control_flow(":=_003", 0, "---_001")
        .add_bug("---", "---_001")
        .add_control_flow("+++_001", 0, "++_001")
        .add_bug("++", "++_001")
        .add_control_flow("---_001", 0, "--_001")
        .add_bug("--", "--_001")
        .add_control_flow("++_001", 1, "+++_001")
        .add_control_flow("--_001", 1, "---_001")
        .add_data_flow("0_001", ":=_004", 0)
        .add_data_flow(":=_004", "+++_001", 0)
        .add_data_flow(":=_004", "---_001", 0)
        .add_data_flow(":=_002", "++_001", 0)
        .add_data_flow("++_001", "++_001", 0)
        .add_data_flow(":=_003", "--_001", 0)
        .add_data_flow("--_001", "--_001", 0)
        .connect_control_in_interface("==0_001")
        .connect_control_out_interface(":=_001", 0, 0)
        .connect_control_out_interface("++_001", 0, 0)
        .connect_control_out_interface("--_001", 0, 0)
        .connect_data_in_interface("==0_001", 0, 0)
        .connect_data_in_interface("?+_001", 0, 0)
        .connect_data_in_interface(":=_001", 0, 0)
        .connect_data_in_interface(":=_002", 0, 0)
        .connect_data_in_interface(":=_003", 0, 0)
        .connect_data_out_interface(":=_001")
        .connect_data_out_interface("+++_001")
        .connect_data_out_interface("---_001");
    Specification::composite("-x", 1, 1, p)
}

fn minus() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug("-x", "-x_001")
        .add_bug(ADD, "+_001")
        .add_control_flow("-x_001", 0, "+_001")
        .add_data_flow("-x_001", "+_001", 1)
        .connect_control_in_interface("-x_001")
        .connect_control_out_interface("+_001", 0, 0)
        .connect_control_out_interface("+_001", 1, 1)
        .connect_data_in_interface("+_001", 0, 0)
        .connect_data_in_interface("-x_001", 0, 1)
        .connect_data_out_interface("+_001");
    Specification::composite("-", 2, 2, p)
}

fn compare() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug(ADD, "1_001")
        .add_data_flow("0_001", "1_001", 0)
        .add_control_flow("1_001", 1, "-_001")
        .add_bug("-", "-_001")
        .add_control_flow("-_001", 0, ":=_001")
        .add_bug(":=", ":=_001")
        .add_control_flow("-_001", 1, ":=_002")
        .add_bug(":=", ":=_002")
        .add_data_flow("1_001", ":=_001", 0)
        .add_data_flow("0_001", ":=_002", 0)
        .connect_control_in_interface("1_001")
        .connect_control_out_interface(":=_002", 0, 0)
        .connect_control_out_interface(":=_001", 0, 1)
        .connect_data_in_interface("-_001", 0, 0)
        .connect_data_in_interface("-_001", 1, 1)
        .connect_data_out_interface(":=_001")
        .connect_data_out_interface(":=_002");
    Specification::composite("==", 2, 2, p)
}

fn multiply() -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug(ADD, "0_001")
        .add_bug(ADD, "0_002")
        .add_bug(ADD, "0_003")
        .add_control_flow("0_001", 0, "0_002")
        .add_control_flow("0_002", 0, "0_003")
        .add_control_flow("0_003", 0, "==_001")
        .add_bug("==", "==_001")
        .add_control_flow("==_001", 1, ":=_001")
        .add_bug(":=", ":=_001")
        .add_control_flow("==_001", 0, "==_002")
        .add_bug("==", "==_002")
        .add_control_flow("==_002", 1, ":=_001")
        .add_control_flow("==_002", 0, "+_001")
        .add_bug(ADD, "+_001")
        .add_control_flow("+_001", 1, "+++_001")
        .add_bug("+++", "+++_001")
        .add_control_flow("+++_001", 0, "==_001")
        .add_data_flow("0_001", "==_001", 1)
        .add_data_flow("0_002", ":=_001", 0)
        .add_data_flow("0_003", "==_002", 1)
        .add_data_flow("0_002", "+_001", 1)
        .add_data_flow("0_001", "+++_001", 0)
        .add_data_flow("+_001", ":=_001", 0)
        .add_data_flow("+_001", "+_001", 1)
        .add_data_flow("+++_001", "==_001", 1)
        .connect_control_in_interface("0_001")
        .connect_control_out_interface(":=_001", 0, 0)
        .connect_data_in_interface("==_001", 0, 0)
        .connect_data_in_interface("==_002", 0, 1)
        .connect_data_in_interface("+_001", 0, 1)
        .connect_data_out_interface(":=_001");
    Specification::composite("*", 2, 1, p)
}

/// Shared skeleton of `max` and `min`: subtract, test the sign, copy one of
/// the inputs. `on_positive` names the external input copied when x - y > 0.
fn select_by_sign(identifier: &str, on_positive: usize, otherwise: usize) -> Specification {
    let mut p = ProgramImplementation::new();
    p.add_bug("-", "-_001")
        .add_bug("?+", "?+_001")
        .add_bug(":=", ":=_001")
        .add_bug(":=", ":=_002")
        .add_data_flow("-_001", "?+_001", 0)
        .connect_data_in_interface(":=_001", 0, otherwise)
        .connect_data_in_interface(":=_002", 0, on_positive)
        .connect_data_in_interface("-_001", 0, 0)
        .connect_data_in_interface("-_001", 1, 1)
        .connect_data_out_interface(":=_001")
        .connect_data_out_interface(":=_002")
        .connect_control_out_interface(":=_001", 0, 0)
        .connect_control_out_interface(":=_002", 0, 1)
        .connect_control_in_interface("-_001")
        .add_control_flow("-_001", 0, "?+_001")
        .add_control_flow("-_001", 1, "?+_001")
        .add_control_flow("?+_001", 0, ":=_001")
        .add_control_flow("?+_001", 1, ":=_002");
    Specification::composite(identifier, 2, 2, p)
}

fn max() -> Specification {
    select_by_sign("max", 0, 1)
}

fn min() -> Specification {
    select_by_sign("min", 1, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_every_program() {
        let library = arithmetic_library();
        for id in ARITHMETIC_IDS {
            assert!(library.contains_specification(id), "missing `{id}`");
        }
        assert_eq!(library.len(), ARITHMETIC_IDS.len() + 2);
    }

    #[test]
    fn second_install_is_rejected() {
        let mut library = arithmetic_library();
        assert_eq!(
            install_arithmetic(&mut library),
            Err(LibraryError::DuplicateSpecification("++".into()))
        );
    }

    #[test]
    fn every_program_replays_cleanly() {
        let library = arithmetic_library();
        for id in ARITHMETIC_IDS {
            let program = library.instantiate(id).unwrap();
            assert!(program.issues().is_empty(), "`{id}`: {:?}", program.issues());
            assert!(program.control_in().is_some(), "`{id}` has no control input");
        }
    }
}
