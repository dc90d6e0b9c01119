use test_log::test;

use super::*;

const TEST_CASES: [(bool, bool); 4] =
    [(false, false), (false, true), (true, false), (true, true)];

fn half_adder() -> CompositeGate {
    CompositeGate::new("HALF_ADDER", 2, 2, |i| vec![i[0] ^ i[1], i[0] && i[1]])
}

fn set_inputs(gate: &mut Gate, values: &[bool]) {
    for (i, v) in values.iter().enumerate() {
        gate.input_mut(i).expect("input should exist").set(*v);
    }
}

fn test_gate_truth_table(mut gate: Gate, expected_fn: fn(bool, bool) -> bool, gate_name: &str) {
    assert_eq!(gate.inputs().len(), 2);
    assert_eq!(gate.outputs().len(), 1);

    for (input_a, input_b) in TEST_CASES {
        set_inputs(&mut gate, &[input_a, input_b]);
        gate.evaluate().expect("primitive evaluation should succeed");

        assert_eq!(
            gate.output_values(),
            vec![expected_fn(input_a, input_b)],
            "Evaluation should be correct for {gate_name}({input_a}, {input_b})"
        );
    }
}

#[test]
fn test_and_gate() {
    test_gate_truth_table(Gate::and(), |a, b| a && b, "AND");
}

#[test]
fn test_or_gate() {
    test_gate_truth_table(Gate::or(), |a, b| a || b, "OR");
}

#[test]
fn test_nand_gate() {
    test_gate_truth_table(Gate::nand(), |a, b| !(a && b), "NAND");
}

#[test]
fn test_nor_gate() {
    test_gate_truth_table(Gate::nor(), |a, b| !(a || b), "NOR");
}

#[test]
fn test_xor_gate() {
    test_gate_truth_table(Gate::xor(), |a, b| a ^ b, "XOR");
}

#[test]
fn test_xnor_gate() {
    test_gate_truth_table(Gate::xnor(), |a, b| !(a ^ b), "XNOR");
}

#[test]
fn test_not_gate() {
    let mut gate = Gate::not();
    assert_eq!(gate.inputs().len(), 1);

    for input in [false, true] {
        set_inputs(&mut gate, &[input]);
        gate.evaluate().unwrap();
        assert_eq!(gate.output_values(), vec![!input], "NOT({input})");
    }
}

#[test]
fn test_inverting_flag_is_cosmetic() {
    assert!(Gate::nand().output(0).unwrap().is_inverting());
    assert!(Gate::not().output(0).unwrap().is_inverting());
    assert!(!Gate::and().output(0).unwrap().is_inverting());
    assert!(!Gate::composite(half_adder()).output(1).unwrap().is_inverting());
}

#[test]
fn test_composite_gate() {
    let mut gate = Gate::composite(half_adder());
    assert_eq!(gate.type_name(), "HALF_ADDER");

    for (a, b) in TEST_CASES {
        set_inputs(&mut gate, &[a, b]);
        gate.evaluate().unwrap();
        assert_eq!(gate.output_values(), vec![a ^ b, a && b]);
    }
}

#[test]
fn test_composite_wrong_output_width() {
    let broken = CompositeGate::new("BROKEN", 2, 2, |i| vec![i[0]]);
    let mut gate = Gate::composite(broken);
    set_inputs(&mut gate, &[true, true]);

    assert_eq!(
        gate.evaluate(),
        Err(GateError::OutputArity {
            name: "BROKEN".to_owned(),
            expected: 2,
            actual: 1,
        })
    );
    assert_eq!(gate.output_values(), vec![false, false]);
}

#[test]
fn test_with_arity_rejects_mismatch() {
    assert!(Gate::with_arity(GateType::And, 2, 1).is_ok());
    assert_eq!(
        Gate::with_arity(GateType::Not, 2, 1).unwrap_err(),
        GateError::ArityMismatch {
            kind: "NOT".to_owned(),
            side: "inputs",
            expected: 1,
            actual: 2,
        }
    );
    assert!(matches!(
        Gate::with_arity(half_adder(), 2, 1),
        Err(GateError::ArityMismatch { side: "outputs", .. })
    ));
}

#[test]
fn test_copy_resets_terminals_and_id() {
    let mut gate = Gate::nand().at(Position::new(40, 80));
    gate.assign_id(7);
    gate.evaluate().unwrap();
    assert_eq!(gate.output_values(), vec![true]);

    let copy = gate.copy();
    assert_eq!(copy.id(), None);
    assert_eq!(copy.type_name(), "NAND");
    assert_eq!(copy.position(), Position::new(40, 80));
    assert_eq!(copy.input_values(), vec![false, false]);
    assert_eq!(copy.output_values(), vec![false]);
}

#[test]
fn test_display() {
    let mut gate = Gate::or();
    set_inputs(&mut gate, &[true, false]);
    gate.evaluate().unwrap();
    assert_eq!(gate.to_string(), "OR [10] -> [1]");

    gate.assign_id(3);
    assert_eq!(gate.to_string(), "OR#3 [10] -> [1]");
}
