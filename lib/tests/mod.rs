//! Cross-module scenarios: a driver's-eye view of the crate.

use crate::architecture::RegisterFile;
use crate::domain::{AbstractEnvironment, Bool3, StridedInterval, ValueSet};
use crate::esil::Transformer;
use crate::types::DataWidth;

const W: DataWidth = DataWidth::R64;

fn register_file() -> RegisterFile {
    RegisterFile::new(W)
        .with_registers(vec!["rax", "rbx", "rcx"])
        .with_flags(vec!["zf", "cf"])
}

fn global(value: u64) -> ValueSet {
    ValueSet::new_global(StridedInterval::singleton(value, W))
}

// Interpret a straight-line sequence of instructions the way a driver
// would, threading each output environment into the next instruction.
#[test]
fn straight_line_block() {
    let registers = register_file();
    let transformer = Transformer::new(&registers);

    let mut env = AbstractEnvironment::new();
    env.set_register("rax", ValueSet::new_top(W));
    env.set_register("rbx", ValueSet::new_top(W));

    for esil in ["0x10,rax,=", "rax,rbx,=", "8,rbx,+=", "1,zf,="] {
        env = transformer.transform(esil, &env).unwrap().environment;
    }

    assert_eq!(env.register("rax"), Some(&global(0x10)));
    assert_eq!(env.register("rbx"), Some(&global(0x18)));
    assert_eq!(env.flag("zf"), Some(Bool3::True));
}

// A two-predecessor merge point: the driver joins the environments, and
// the join covers both incoming states.
#[test]
fn merge_point_join() {
    let registers = register_file();
    let transformer = Transformer::new(&registers);

    let mut entry = AbstractEnvironment::new();
    entry.set_register("rax", ValueSet::new_top(W));

    let then_env = transformer.transform("1,rax,=", &entry).unwrap().environment;
    let else_env = transformer.transform("9,rax,=", &entry).unwrap().environment;

    let merged = then_env.join(&else_env);
    let rax = merged.register("rax").unwrap().global();
    assert!(rax.contains(1));
    assert!(rax.contains(9));
    assert!(!rax.contains(2));
    assert_eq!(merged, else_env.join(&then_env));
}

// A loop back-edge under widening stabilizes instead of climbing the
// interval lattice one step at a time.
#[test]
fn back_edge_widening_stabilizes() {
    let registers = register_file();
    let transformer = Transformer::new(&registers);

    let mut env = AbstractEnvironment::new();
    env.set_register("rcx", global(0));

    // rcx += 1 around the loop until the environment stops changing.
    let mut iterations = 0;
    loop {
        let body = transformer.transform("1,rcx,+=", &env).unwrap().environment;
        let widened = env.widen(&body);
        if widened == env {
            break;
        }
        env = widened;
        iterations += 1;
        assert!(iterations < 10, "widening failed to stabilize");
    }
    assert!(env.register("rcx").unwrap().global().is_top());
}

// The coercion round trip: a Bool3 pushed through a register and read
// back as a flag loses nothing it did not have to lose.
#[test]
fn boolean_round_trip() {
    let registers = register_file();
    let transformer = Transformer::new(&registers);

    for (value, expected) in [
        (Bool3::True, Bool3::True),
        (Bool3::False, Bool3::False),
        (Bool3::Maybe, Bool3::Maybe),
    ] {
        let mut env = AbstractEnvironment::new();
        env.set_flag("cf", value);
        // cf -> rax (as a value set), rax -> zf (back to a boolean)
        let env = transformer.transform("cf,rax,=", &env).unwrap().environment;
        let env = transformer.transform("rax,zf,=", &env).unwrap().environment;
        assert_eq!(env.flag("zf"), Some(expected));
    }
}

// Environments serialize, so a driver can persist the analysis state it
// associates with each program point.
#[test]
fn environment_serde_round_trip() {
    let mut env = AbstractEnvironment::new();
    env.set_register("rax", global(0x40));
    env.set_register(
        "rbx",
        ValueSet::new_global(StridedInterval::strided(0, 8, 4, W)),
    );
    env.set_register("rcx", ValueSet::new_top(W));
    env.set_flag("zf", Bool3::Maybe);

    let json = serde_json::to_string(&env).unwrap();
    let decoded: AbstractEnvironment = serde_json::from_str(&json).unwrap();
    assert_eq!(env, decoded);
}
