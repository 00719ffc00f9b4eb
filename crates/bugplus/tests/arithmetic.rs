//! Standard arithmetic programs, driven through the test harness

use bugplus::stdlib::arithmetic_library;
use bugplus::test_harness::TestProgram;

#[test]
fn increment_adds_one() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "++");

    for x in [0, 1, 2, 100] {
        let step = test.with_inputs(&[x]).assert_output(x + 1);
        assert_eq!(step.exit.exit_index, Some(1));
    }

    // x + 1 == 0 leaves through the zero exit
    let step = test.with_inputs(&[-1]).assert_output(0);
    assert_eq!(step.exit.exit_index, Some(0));
}

#[test]
fn decrement_subtracts_one() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "--");

    test.with_inputs(&[10]).assert_output(9);
    test.with_inputs(&[-4]).assert_output(-5);
    test.with_inputs(&[1]).assert_exit(0);
}

#[test]
fn assignment_copies() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, ":=");

    for x in [0, 7, -3] {
        test.with_inputs(&[x]).assert_output(x);
    }
    test.with_inputs(&[0]).assert_exit(0);
    test.with_inputs(&[5]).assert_exit(0);
}

#[test]
fn zero_test_branches() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "==0");

    test.with_inputs(&[0]).assert_exit(1);
    test.with_inputs(&[5]).assert_exit(0);
    test.with_inputs(&[-3]).assert_exit(0);
    // no data output is exposed
    assert_eq!(test.run().output, None);
}

#[test]
fn increment_iterator_accumulates() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "+++");

    test.with_inputs(&[5]);
    test.assert_output(6);
    test.assert_output(7);
    test.assert_output(8);

    // writing the input reseeds the accumulator
    test.with_inputs(&[0]).assert_output(1);
}

#[test]
fn decrement_iterator_accumulates() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "---");

    test.with_inputs(&[2]);
    test.assert_output(1);
    test.assert_output(0);
    test.assert_output(-1);
}

#[test]
fn pseudo_parallel_alternates() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "||");

    let exits: Vec<_> = (0..4).map(|_| test.run().exit.exit_index).collect();
    assert_eq!(exits, vec![Some(0), Some(1), Some(0), Some(1)]);
}

#[test]
fn sign_test() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "?+");

    test.with_inputs(&[5]).assert_exit(1);
    test.with_inputs(&[-4]).assert_exit(0);
    test.with_inputs(&[0]).assert_exit(0);
    test.with_inputs(&[1]).assert_exit(1);
}

#[test]
fn negation() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "-x");

    test.with_inputs(&[3]).assert_output(-3);
    test.with_inputs(&[-6]).assert_output(6);
    test.with_inputs(&[0]).assert_output(0);
}

#[test]
fn subtraction() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "-");
    test.assert_clean();

    test.with_inputs(&[7, 3]).assert_output(4);
    test.with_inputs(&[2, 5]).assert_output(-3);
    let step = test.with_inputs(&[3, 3]).assert_output(0);
    assert_eq!(step.exit.exit_index, Some(0));
}

#[test]
fn equality() {
    let library = arithmetic_library();
    let mut test = TestProgram::new(&library, "==");

    test.with_inputs(&[4, 4]).assert_exit(1);
    test.with_inputs(&[4, 5]).assert_exit(0);
    test.with_inputs(&[-2, -2]).assert_output(1);
}

#[test]
fn max_and_min_pick_an_input() {
    let library = arithmetic_library();

    let mut max = TestProgram::new(&library, "max");
    max.with_inputs(&[3, 8]).assert_output(8);
    max.with_inputs(&[9, 2]).assert_output(9);

    let mut min = TestProgram::new(&library, "min");
    min.with_inputs(&[3, 8]).assert_output(3);
    min.with_inputs(&[9, 2]).assert_output(2);
}

#[test]
fn multiplication() {
    let library = arithmetic_library();

    for (x, y, product) in [(3, 4, 12), (0, 5, 0), (5, 0, 0), (2, 7, 14)] {
        let mut test = TestProgram::new(&library, "*");
        test.assert_clean();
        test.with_inputs(&[x, y]).assert_output(product);
    }
}
