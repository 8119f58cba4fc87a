//! Parallel RPN evaluator (`spec.md` §4.2).
//!
//! Each reduction pass spawns one concurrent unit of work per ready
//! `(a, b, op)` window, so the wall-clock cost of a pass is the slowest
//! operator-class timeout in it rather than their sum. Passes run until a
//! single token remains.

use calc_types::{CalcError, CalcResult, Operator, OperatorTimeouts};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Evaluate a postfix (RPN) token sequence produced by `calc_compiler::compile`.
#[instrument(skip(timeouts))]
pub async fn evaluate(postfix: &str, timeouts: &OperatorTimeouts) -> CalcResult<i64> {
    let mut tokens: Vec<String> = postfix.split_whitespace().map(str::to_string).collect();

    if tokens.is_empty() {
        return Err(CalcError::InvalidExpression("empty postfix sequence".into()));
    }

    while tokens.len() > 1 {
        debug!(pass_len = tokens.len(), "starting reduction pass");
        tokens = reduce_pass(tokens, timeouts).await?;
    }

    tokens[0]
        .parse::<i64>()
        .map_err(|_| CalcError::EvaluationFailure(format!("not a numeric literal: {}", tokens[0])))
}

#[derive(Debug, Clone, Copy)]
struct ReadyWindow {
    start: usize,
    a: i64,
    b: i64,
    op: Operator,
}

fn find_ready_windows(tokens: &[String]) -> Vec<ReadyWindow> {
    let mut windows = Vec::new();
    let mut i = 0;
    while i + 3 <= tokens.len() {
        let a = tokens[i].parse::<i64>();
        let b = tokens[i + 1].parse::<i64>();
        let op = parse_operator(&tokens[i + 2]);

        match (a, b, op) {
            (Ok(a), Ok(b), Some(op)) => {
                windows.push(ReadyWindow { start: i, a, b, op });
                i += 3;
            }
            _ => i += 1,
        }
    }
    windows
}

fn parse_operator(token: &str) -> Option<Operator> {
    let mut chars = token.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Operator::from_symbol(c)
}

/// Run one reduction pass: spawn every ready window concurrently, join all
/// of them, then rebuild the token sequence by substituting each window's
/// result at its own index. Windows are keyed by index, not by their
/// textual rendering, so two windows that render identically in the same
/// pass (e.g. `1 + 1` appearing twice) never collide (`spec.md` §9).
async fn reduce_pass(tokens: Vec<String>, timeouts: &OperatorTimeouts) -> CalcResult<Vec<String>> {
    let windows = find_ready_windows(&tokens);
    if windows.is_empty() {
        return Err(CalcError::EvaluationFailure(
            "no ready reduction in a non-terminal postfix sequence".into(),
        ));
    }

    let results: Arc<Mutex<HashMap<usize, CalcResult<i64>>>> =
        Arc::new(Mutex::new(HashMap::with_capacity(windows.len())));
    let mut handles = Vec::with_capacity(windows.len());

    for window in windows {
        let results = Arc::clone(&results);
        let delay = timeouts.get(window.op);
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let value = apply(window.a, window.op, window.b);
            results.lock().await.insert(window.start, value);
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| CalcError::EvaluationFailure(format!("reduction task panicked: {e}")))?;
    }

    let results = Arc::try_unwrap(results)
        .expect("all spawned tasks have completed and dropped their clone")
        .into_inner();

    rebuild(&tokens, results)
}

fn rebuild(tokens: &[String], results: HashMap<usize, CalcResult<i64>>) -> CalcResult<Vec<String>> {
    let mut rebuilt = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        match results.get(&i) {
            Some(Ok(value)) => {
                rebuilt.push(value.to_string());
                i += 3;
            }
            Some(Err(e)) => return Err(e.clone()),
            None => {
                rebuilt.push(tokens[i].clone());
                i += 1;
            }
        }
    }
    Ok(rebuilt)
}

fn apply(a: i64, op: Operator, b: i64) -> CalcResult<i64> {
    match op {
        Operator::Add => Ok(a.wrapping_add(b)),
        Operator::Sub => Ok(a.wrapping_sub(b)),
        Operator::Mul => Ok(a.wrapping_mul(b)),
        Operator::Div => {
            if b == 0 {
                Err(CalcError::EvaluationFailure("division by zero".into()))
            } else {
                Ok(a.wrapping_div(b))
            }
        }
    }
}

/// A plain stack-based serial evaluator, used as a reference oracle in
/// tests: with all operator timeouts at zero, `evaluate` must agree with
/// this function on every valid postfix sequence (`spec.md` §8).
pub fn serial_evaluate(postfix: &str) -> CalcResult<i64> {
    let mut stack: Vec<i64> = Vec::new();
    for token in postfix.split_whitespace() {
        if let Ok(n) = token.parse::<i64>() {
            stack.push(n);
        } else if let Some(op) = parse_operator(token) {
            let b = stack
                .pop()
                .ok_or_else(|| CalcError::EvaluationFailure("stack underflow".into()))?;
            let a = stack
                .pop()
                .ok_or_else(|| CalcError::EvaluationFailure("stack underflow".into()))?;
            stack.push(apply(a, op, b)?);
        } else {
            return Err(CalcError::InvalidExpression(format!(
                "unrecognised token '{token}'"
            )));
        }
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        _ => Err(CalcError::EvaluationFailure(
            "postfix sequence did not reduce to a single value".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn zero_timeouts() -> OperatorTimeouts {
        OperatorTimeouts::default()
    }

    #[tokio::test]
    async fn single_token_returns_unchanged_with_no_work_spawned() {
        assert_eq!(evaluate("42", &zero_timeouts()).await.unwrap(), 42);
        assert_eq!(evaluate("-7", &zero_timeouts()).await.unwrap(), -7);
    }

    #[tokio::test]
    async fn empty_sequence_is_invalid() {
        assert!(matches!(
            evaluate("", &zero_timeouts()).await,
            Err(CalcError::InvalidExpression(_))
        ));
    }

    #[tokio::test]
    async fn scenario_1_one_plus_two() {
        let postfix = calc_compiler::compile("1 + 2").unwrap();
        assert_eq!(evaluate(&postfix, &zero_timeouts()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn scenario_2_precedence() {
        let postfix = calc_compiler::compile("1 - 3 * 2").unwrap();
        assert_eq!(evaluate(&postfix, &zero_timeouts()).await.unwrap(), -5);
    }

    #[tokio::test]
    async fn scenario_3_leading_unary_minus() {
        let postfix = calc_compiler::compile("-4 + 10 / 3").unwrap();
        assert_eq!(evaluate(&postfix, &zero_timeouts()).await.unwrap(), -1);
    }

    #[tokio::test]
    async fn scenario_6_division_by_zero_is_invalid() {
        let postfix = calc_compiler::compile("6 / 0").unwrap();
        assert!(matches!(
            evaluate(&postfix, &zero_timeouts()).await,
            Err(CalcError::EvaluationFailure(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_windows_in_the_same_pass_are_disambiguated_by_index() {
        // "1 1 + 1 1 + +" has two identical `1 1 +` windows in one pass.
        let postfix = "1 1 + 1 1 + +";
        assert_eq!(evaluate(postfix, &zero_timeouts()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn timeouts_run_concurrently_not_additively() {
        let mut timeouts = zero_timeouts();
        timeouts.add = Duration::from_millis(80);
        // Two independent `+` windows ready in the same pass.
        let postfix = "1 1 + 2 2 + +";
        let start = std::time::Instant::now();
        let result = evaluate(postfix, &timeouts).await.unwrap();
        assert_eq!(result, 6);
        // Serial execution would take ~160ms; concurrent should stay near 80ms.
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    proptest::proptest! {
        #[test]
        fn zero_timeout_evaluator_matches_serial_reference(
            a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000,
        ) {
            let postfix = format!("{a} {b} + {c} +");
            let rt = tokio::runtime::Runtime::new().unwrap();
            let parallel = rt.block_on(evaluate(&postfix, &zero_timeouts())).unwrap();
            let serial = serial_evaluate(&postfix).unwrap();
            prop_assert_eq!(parallel, serial);
        }
    }
}
