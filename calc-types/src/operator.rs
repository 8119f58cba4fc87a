//! Arithmetic operators and the process-wide operator-timeout table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// One of the four binary arithmetic operators the compiler recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// The single-character infix symbol for this operator.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// Parse an infix symbol into an operator, if it is one.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    /// Shunting-yard precedence: `{+,-}` bind looser than `{*,/}`.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
        }
    }

    /// Stable lowercase name used to key the operator-timeout table and the
    /// HTTP timeout API. `spec.md` §9 leaves the choice between keying by
    /// symbol and by name as an open question; this workspace resolves it
    /// in favor of names, applied everywhere.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(Operator::Add),
            "sub" => Some(Operator::Sub),
            "mul" => Some(Operator::Mul),
            "div" => Some(Operator::Div),
            _ => None,
        }
    }

    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Process-wide mapping of operator class to simulated-compute delay.
///
/// Carried inside every `TaskMessage` so workers never keep their own copy
/// (`spec.md` §3). Serializes to/from milliseconds so it matches the HTTP
/// timeout API's `{"add":ms,"sub":ms,"mul":ms,"div":ms}` body shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorTimeouts {
    #[serde(with = "millis")]
    pub add: Duration,
    #[serde(with = "millis")]
    pub sub: Duration,
    #[serde(with = "millis")]
    pub mul: Duration,
    #[serde(with = "millis")]
    pub div: Duration,
}

impl OperatorTimeouts {
    pub fn get(&self, op: Operator) -> Duration {
        match op {
            Operator::Add => self.add,
            Operator::Sub => self.sub,
            Operator::Mul => self.mul,
            Operator::Div => self.div,
        }
    }

    pub fn set(&mut self, op: Operator, timeout: Duration) {
        match op {
            Operator::Add => self.add = timeout,
            Operator::Sub => self.sub = timeout,
            Operator::Mul => self.mul = timeout,
            Operator::Div => self.div = timeout,
        }
    }

    /// Render as the operator-name-to-human-readable-duration map the
    /// `GET /timeouts` endpoint returns.
    pub fn as_display_map(&self) -> HashMap<String, String> {
        Operator::ALL
            .into_iter()
            .map(|op| (op.name().to_string(), format!("{:?}", self.get(op))))
            .collect()
    }
}

impl Default for OperatorTimeouts {
    /// Zero timeouts: the identity element for tests that want serial-speed
    /// evaluation (`spec.md` §8's zero-timeout property).
    fn default() -> Self {
        Self {
            add: Duration::ZERO,
            sub: Duration::ZERO,
            mul: Duration::ZERO,
            div: Duration::ZERO,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_and_name_roundtrip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
            assert_eq!(Operator::from_name(op.name()), Some(op));
        }
    }

    #[test]
    fn precedence_orders_mul_div_above_add_sub() {
        assert!(Operator::Mul.precedence() > Operator::Add.precedence());
        assert!(Operator::Div.precedence() > Operator::Sub.precedence());
        assert_eq!(Operator::Add.precedence(), Operator::Sub.precedence());
        assert_eq!(Operator::Mul.precedence(), Operator::Div.precedence());
    }

    #[test]
    fn timeouts_serialize_as_milliseconds() {
        let timeouts = OperatorTimeouts {
            add: Duration::from_millis(1000),
            sub: Duration::from_millis(0),
            mul: Duration::from_millis(10_000),
            div: Duration::from_millis(250),
        };
        let json = serde_json::to_value(&timeouts).unwrap();
        assert_eq!(json["mul"], 10_000);
        let back: OperatorTimeouts = serde_json::from_value(json).unwrap();
        assert_eq!(back, timeouts);
    }
}
