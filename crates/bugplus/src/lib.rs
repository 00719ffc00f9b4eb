//! Bug+ graph runtime.
//!
//! Programs are networks of nodes ("bugs") joined by data edges, which carry
//! integers through shared variables, and by control edges, which pass a
//! single execution token. Composite node types are recorded as statement
//! logs in a [`Library`] and replayed into a fresh [`Graph`] on every
//! instantiation.
//!
//! ```
//! use bugplus::stdlib::arithmetic_library;
//!
//! let library = arithmetic_library();
//! let mut program = library.instantiate("++").unwrap();
//! program.set_input_value(0, 41).unwrap();
//! let step = program.step().unwrap();
//! assert_eq!(step.output, Some(42));
//! ```

mod arena;
mod instantiate;

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod graph;
pub mod handle;
pub mod interface;
pub mod library;
pub mod node;
pub mod pin;
pub mod primitive;
pub mod program;
pub mod specification;
pub mod statement;
pub mod stdlib;
pub mod test_harness;
pub mod trace;
pub mod translate;
pub mod variable;

pub use config::EngineConfig;
pub use driver::{CaseReport, Driver};
pub use engine::Exit;
pub use error::{BuildIssue, Error, ExecError, InstantiateError, LibraryError, PinError};
pub use graph::Graph;
pub use handle::{ControlInId, ControlOutId, DataInId, DataOutId, InstanceId, VariableId};
pub use library::{InstantiateOptions, Library};
pub use primitive::Primitive;
pub use program::{Program, Step};
pub use specification::{Implementation, ProgramImplementation, Specification};
pub use statement::Statement;
