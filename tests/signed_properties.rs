//! Property tests: generated code against host `i64` arithmetic

use proptest::prelude::*;
use sint_codegen::{
    build_add, build_negate, build_negate_wrapping, build_shift_right, build_shift_right_by,
    build_sub, compile, int, sint, Node,
};
use sint_runtime::{run, RuntimeError};
use sint_spec::{decode, encode, Config};

fn s(n: i64) -> Node {
    sint(n as i128).unwrap()
}

fn eval(node: &Node) -> Result<i64, RuntimeError> {
    let program = compile(node, &Config::DEFAULT).expect("Lowering failed");
    run(&program).map(decode)
}

fn is_trap(result: &Result<i64, RuntimeError>) -> bool {
    matches!(result, Err(RuntimeError::AssertionFailed { .. }))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn test_add_matches_checked_add(a in any::<i64>(), b in any::<i64>()) {
        let result = eval(&build_add(s(a), s(b)));
        match a.checked_add(b) {
            Some(sum) => prop_assert_eq!(result.unwrap(), sum),
            None => prop_assert!(is_trap(&result)),
        }
    }

    #[test]
    fn test_add_near_the_edges(a in prop_oneof![i64::MIN..i64::MIN + 4, i64::MAX - 4..=i64::MAX],
                               b in -4i64..=4) {
        let result = eval(&build_add(s(a), s(b)));
        match a.checked_add(b) {
            Some(sum) => prop_assert_eq!(result.unwrap(), sum),
            None => prop_assert!(is_trap(&result)),
        }
    }

    #[test]
    fn test_sub_matches_checked_sub(a in any::<i64>(), b in any::<i64>()) {
        let result = eval(&build_sub(s(a), s(b)));
        // Subtracting MIN always traps: its negation is not representable
        match a.checked_sub(b).filter(|_| b != i64::MIN) {
            Some(diff) => prop_assert_eq!(result.unwrap(), diff),
            None => prop_assert!(is_trap(&result)),
        }
    }

    #[test]
    fn test_negate_matches_checked_neg(a in any::<i64>()) {
        let result = eval(&build_negate(s(a)));
        match a.checked_neg() {
            Some(neg) => prop_assert_eq!(result.unwrap(), neg),
            None => prop_assert!(is_trap(&result)),
        }
    }

    #[test]
    fn test_negate_wrapping_matches_wrapping_neg(a in any::<i64>()) {
        prop_assert_eq!(eval(&build_negate_wrapping(s(a))).unwrap(), a.wrapping_neg());
    }

    #[test]
    fn test_shift_right_is_floor_division(a in any::<i64>(), k in 0u32..=63) {
        let expected = a >> k;
        prop_assert_eq!(eval(&build_shift_right_by(s(a), k).unwrap()).unwrap(), expected);
        prop_assert_eq!(
            expected as i128,
            (a as i128).div_euclid(1i128 << k)
        );
    }

    #[test]
    fn test_dynamic_shift_right(a in any::<i64>(), k in 0u64..=63) {
        // A computed amount takes the runtime-checked path
        let amount = build_add(int(k), int(0));
        let shifted = build_shift_right(s(a), amount).unwrap();
        prop_assert_eq!(eval(&shifted).unwrap(), a >> k);
    }

    #[test]
    fn test_result_is_canonical_encoding(a in any::<i32>(), b in any::<i32>()) {
        let program = compile(&build_add(s(a as i64), s(b as i64)), &Config::DEFAULT).unwrap();
        let word = run(&program).unwrap();
        prop_assert_eq!(word, encode(a as i128 + b as i128).unwrap());
    }
}
