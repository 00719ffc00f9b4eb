//! Native node behaviours.
//!
//! A primitive is a pure function of its input readings (value plus
//! connectedness) to an output value and the index of the control output to
//! fire. Stateful primitives additionally replace the node's register.

use std::fmt;

/// Identifier of the adder in every library.
pub const ADDER_ID: &str = "+";
/// Identifier of the bit register.
pub const BIT_ID: &str = "!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Two inputs, sums them when both are connected.
    Adder,
    /// One binary input, emits its negation and remembers it.
    Bit,
}

/// What a primitive sees on one data input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinReading {
    pub connected: bool,
    pub value: i64,
}

impl PinReading {
    pub fn connected(value: i64) -> Self {
        Self {
            connected: true,
            value,
        }
    }

    pub fn unconnected() -> Self {
        Self {
            connected: false,
            value: 0,
        }
    }
}

/// Result of one primitive firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub output: i64,
    /// Index into the node's control outputs
    pub control_out: usize,
    /// New register value; `Some` marks the firing as a counted call
    pub register: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveFault {
    /// Bit register fed something other than 0 or 1
    InvalidBit(i64),
}

impl fmt::Display for PrimitiveFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveFault::InvalidBit(value) => {
                write!(f, "bit input must be 0 or 1, got {value}")
            }
        }
    }
}

impl Primitive {
    pub const ALL: [Primitive; 2] = [Primitive::Adder, Primitive::Bit];

    pub fn identifier(self) -> &'static str {
        match self {
            Primitive::Adder => ADDER_ID,
            Primitive::Bit => BIT_ID,
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.identifier() == identifier)
    }

    pub fn num_data_in(self) -> usize {
        match self {
            Primitive::Adder => 2,
            Primitive::Bit => 1,
        }
    }

    pub fn num_control_out(self) -> usize {
        2
    }

    /// Whether firings count against the call ceiling.
    pub fn is_stateful(self) -> bool {
        matches!(self, Primitive::Bit)
    }

    /// Initial value of each data-input variable for a fresh node.
    pub(crate) fn initial_input_value(self, register: i64) -> i64 {
        match self {
            Primitive::Adder => 0,
            Primitive::Bit => register,
        }
    }

    pub fn evaluate(self, inputs: &[PinReading]) -> Result<Evaluation, PrimitiveFault> {
        match self {
            Primitive::Adder => {
                let a = inputs.first().copied().unwrap_or_else(PinReading::unconnected);
                let b = inputs.get(1).copied().unwrap_or_else(PinReading::unconnected);
                let output = match (a.connected, b.connected) {
                    (false, false) => 0,
                    (true, false) => 1,
                    (false, true) => -1,
                    (true, true) => a.value.wrapping_add(b.value),
                };
                Ok(Evaluation {
                    output,
                    control_out: branch(output),
                    register: None,
                })
            }
            Primitive::Bit => {
                let bit = inputs.first().map_or(0, |reading| reading.value);
                let output = match bit {
                    0 => 1,
                    1 => 0,
                    other => return Err(PrimitiveFault::InvalidBit(other)),
                };
                Ok(Evaluation {
                    output,
                    control_out: branch(output),
                    register: Some(output),
                })
            }
        }
    }
}

/// Zero fires control output 0, anything else control output 1.
fn branch(output: i64) -> usize {
    usize::from(output != 0)
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: PinReading, b: PinReading) -> (i64, usize) {
        let eval = Primitive::Adder.evaluate(&[a, b]).unwrap();
        (eval.output, eval.control_out)
    }

    #[test]
    fn adder_truth_table() {
        let none = PinReading::unconnected();
        assert_eq!(add(none, none), (0, 0));
        assert_eq!(add(PinReading::connected(1), none), (1, 1));
        assert_eq!(add(none, PinReading::connected(5)), (-1, 1));
        assert_eq!(add(PinReading::connected(3), PinReading::connected(4)), (7, 1));
        assert_eq!(add(PinReading::connected(3), PinReading::connected(-3)), (0, 0));
    }

    #[test]
    fn unconnected_input_ignores_its_value() {
        let stale = PinReading {
            connected: false,
            value: 42,
        };
        assert_eq!(add(PinReading::connected(9), stale), (1, 1));
    }

    #[test]
    fn adder_wraps_on_overflow() {
        let eval = Primitive::Adder
            .evaluate(&[PinReading::connected(i64::MAX), PinReading::connected(1)])
            .unwrap();
        assert_eq!(eval.output, i64::MIN);
    }

    #[test]
    fn bit_negates_and_stores() {
        let eval = Primitive::Bit.evaluate(&[PinReading::connected(0)]).unwrap();
        assert_eq!(eval.output, 1);
        assert_eq!(eval.control_out, 1);
        assert_eq!(eval.register, Some(1));

        let eval = Primitive::Bit.evaluate(&[PinReading::connected(1)]).unwrap();
        assert_eq!(eval.output, 0);
        assert_eq!(eval.control_out, 0);
    }

    #[test]
    fn bit_rejects_non_binary_input() {
        assert_eq!(
            Primitive::Bit.evaluate(&[PinReading::connected(2)]),
            Err(PrimitiveFault::InvalidBit(2))
        );
    }

    #[test]
    fn identifiers_round_trip() {
        for primitive in Primitive::ALL {
            assert_eq!(Primitive::from_identifier(primitive.identifier()), Some(primitive));
        }
        assert_eq!(Primitive::from_identifier("++"), None);
    }
}
