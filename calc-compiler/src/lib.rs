//! Expression compiler (`spec.md` §4.1): tokenise an infix string,
//! validate it, and emit a whitespace-joined postfix (RPN) token sequence
//! via shunting-yard.
//!
//! `compile` is deterministic and stateless: two calls on the same input
//! always produce the same output, and no call mutates any shared state.

use calc_types::{CalcError, CalcResult, Operator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(i64),
    Op(Operator),
}

/// Compile a whitespace-separated infix expression into a whitespace-joined
/// postfix token string.
pub fn compile(infix: &str) -> CalcResult<String> {
    let raw: Vec<&str> = infix.split_whitespace().collect();
    let tokens = classify(&raw)?;
    validate(&tokens)?;
    let postfix = shunting_yard(&tokens);
    Ok(render(&postfix))
}

fn classify(raw: &[&str]) -> CalcResult<Vec<Token>> {
    raw.iter()
        .map(|s| {
            if let Ok(n) = s.parse::<i64>() {
                Ok(Token::Number(n))
            } else if s.len() == 1 {
                s.chars()
                    .next()
                    .and_then(Operator::from_symbol)
                    .map(Token::Op)
                    .ok_or_else(|| CalcError::InvalidExpression(format!("unrecognised token '{s}'")))
            } else {
                Err(CalcError::InvalidExpression(format!(
                    "unrecognised token '{s}'"
                )))
            }
        })
        .collect()
}

fn validate(tokens: &[Token]) -> CalcResult<()> {
    if tokens.is_empty() {
        return Err(CalcError::InvalidExpression("empty expression".into()));
    }

    // Adjacent operator pairs are always rejected, no exceptions.
    for pair in tokens.windows(2) {
        if let [Token::Op(_), Token::Op(_)] = pair {
            return Err(CalcError::InvalidExpression(
                "adjacent operators are not allowed".into(),
            ));
        }
    }

    // The last token must not be an operator.
    if matches!(tokens.last(), Some(Token::Op(_))) {
        return Err(CalcError::InvalidExpression(
            "expression must not end with an operator".into(),
        ));
    }

    // A leading operator is only legal as unary negation: `-` immediately
    // followed by a numeric literal.
    if let Token::Op(op) = tokens[0] {
        if op != Operator::Sub {
            return Err(CalcError::InvalidExpression(format!(
                "expression must not start with '{op}'"
            )));
        }
        match tokens.get(1) {
            Some(Token::Number(_)) => {}
            _ => {
                return Err(CalcError::InvalidExpression(
                    "leading '-' must be followed by a numeric literal".into(),
                ))
            }
        }
    }

    Ok(())
}

/// Merge a leading unary `-` into the literal that follows it, then run
/// shunting-yard over the remaining binary-only token stream. Validation
/// has already guaranteed a leading `-` is followed by a `Number`.
fn shunting_yard(tokens: &[Token]) -> Vec<Token> {
    let (first, rest) = match tokens {
        [Token::Op(Operator::Sub), Token::Number(n), rest @ ..] => (Token::Number(-n), rest),
        [first, rest @ ..] => (*first, rest),
        [] => unreachable!("validate rejects empty input"),
    };

    let mut output = Vec::with_capacity(tokens.len());
    let mut op_stack: Vec<Operator> = Vec::new();
    push_operand_or_op(first, &mut output, &mut op_stack);

    for &tok in rest {
        push_operand_or_op(tok, &mut output, &mut op_stack);
    }

    while let Some(op) = op_stack.pop() {
        output.push(Token::Op(op));
    }

    output
}

fn push_operand_or_op(tok: Token, output: &mut Vec<Token>, op_stack: &mut Vec<Operator>) {
    match tok {
        Token::Number(_) => output.push(tok),
        Token::Op(incoming) => {
            while let Some(&top) = op_stack.last() {
                if top.precedence() >= incoming.precedence() {
                    output.push(Token::Op(top));
                    op_stack.pop();
                } else {
                    break;
                }
            }
            op_stack.push(incoming);
        }
    }
}

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            Token::Number(n) => n.to_string(),
            Token::Op(op) => op.symbol().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
