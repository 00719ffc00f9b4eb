//! Configuration mistakes: fatal ones abort, the rest are collected as issues

use bugplus::error::{BuildIssue, InstantiateError, PinKind};
use bugplus::stdlib::arithmetic_library;
use bugplus::{ExecError, Library, LibraryError, PinError, Primitive, Specification};

fn library_with(spec: Specification) -> Library {
    let mut library = Library::with_primitives();
    library.add_specification(spec).unwrap();
    library
}

#[test]
fn unknown_root_is_fatal() {
    let library = arithmetic_library();
    assert_eq!(
        library.instantiate("nope").unwrap_err(),
        InstantiateError::Library(LibraryError::UnknownSpecification("nope".into()))
    );
}

#[test]
fn root_without_implementation_is_fatal() {
    let library = library_with(Specification::program("empty", 1, 1));
    assert!(matches!(
        library.instantiate("empty"),
        Err(InstantiateError::Library(LibraryError::ImplementationOutOfRange { index: 0, .. }))
    ));
}

#[test]
fn primitive_specification_rejects_implementations() {
    let mut library = Library::with_primitives();
    let adder = library.select_specification_mut("+").unwrap();
    assert_eq!(
        adder.add_implementation().unwrap_err(),
        LibraryError::NativeSpecification("+".into())
    );
    assert_eq!(Specification::primitive(Primitive::Bit).num_data_in(), 1);
}

#[test]
fn bad_directives_are_skipped_and_recorded() {
    let mut spec = Specification::program("sloppy", 1, 1);
    spec.add_implementation()
        .unwrap()
        .add_bug("+", "a")
        .add_bug("missing", "b")
        .add_data_flow("a", "ghost", 0)
        .add_data_flow("a", "a", 5)
        .connect_data_in_interface("a", 0, 3)
        .connect_control_out_interface("a", 0, 0)
        .connect_control_in_interface("a");
    let program = library_with(spec).instantiate("sloppy").unwrap();
    let issues = program.issues();

    assert!(issues.contains(&BuildIssue::UnknownSpecification {
        program: "sloppy".into(),
        role: "b".into(),
        specification: "missing".into(),
    }));
    assert!(issues.contains(&BuildIssue::UnknownRole {
        program: "sloppy".into(),
        role: "ghost".into(),
    }));
    assert!(issues.contains(&BuildIssue::PinOutOfRange {
        program: "sloppy".into(),
        role: Some("a".into()),
        pin: PinKind::DataIn,
        index: 5,
        arity: 2,
    }));
    assert!(issues.contains(&BuildIssue::PinOutOfRange {
        program: "sloppy".into(),
        role: None,
        pin: PinKind::DataIn,
        index: 3,
        arity: 1,
    }));
    assert_eq!(issues.len(), 4);

    // the valid directives still took effect
    let mut program = program;
    let exit = program.execute().unwrap();
    assert_eq!(exit.exit_index, Some(0));
}

#[test]
fn duplicate_role_replaces_and_is_recorded() {
    let mut spec = Specification::program("twice", 0, 1);
    spec.add_implementation()
        .unwrap()
        .add_bug("+", "a")
        .add_bug("!", "a")
        .connect_control_in_interface("a");
    let program = library_with(spec).instantiate("twice").unwrap();

    assert_eq!(
        program.issues(),
        &[BuildIssue::DuplicateRole {
            program: "twice".into(),
            role: "a".into(),
        }]
    );
    let a = program.bug("a").unwrap();
    assert_eq!(program.graph().instance(a).unwrap().primitive(), Some(Primitive::Bit));
}

#[test]
fn program_without_control_input_cannot_run() {
    let mut spec = Specification::program("inert", 0, 1);
    spec.add_implementation().unwrap().add_bug("+", "a");
    let mut program = library_with(spec).instantiate("inert").unwrap();

    assert_eq!(program.control_in(), None);
    assert_eq!(program.execute().unwrap_err(), ExecError::NoControlInput);
}

#[test]
fn pin_errors() {
    let library = arithmetic_library();
    let mut program = library.instantiate("==0").unwrap();
    let root = program.root();

    assert_eq!(
        program.set_input_value(1, 0).unwrap_err(),
        PinError::InputOutOfRange {
            node: root,
            index: 1,
            arity: 1,
        }
    );
    assert_eq!(program.output_value().unwrap_err(), PinError::OutputUnconnected(root));

    let mut pp = library.instantiate("||").unwrap();
    let root = pp.root();
    assert_eq!(pp.set_internal_state(root, 1).unwrap_err(), PinError::NoDataInputs(root));
}

#[test]
fn nesting_depth_is_configurable() {
    let library = arithmetic_library();
    let options = bugplus::InstantiateOptions {
        config: bugplus::EngineConfig {
            max_nesting_depth: 2,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(library.instantiate_with("++", &options).is_ok());
    assert!(matches!(
        library.instantiate_with("*", &options),
        Err(InstantiateError::NestingTooDeep { limit: 2, .. })
    ));
}
