use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("use format: <a> <op> <b>, e.g. '2 + 3'")]
    Format,
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),
    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluates exactly `<a> <op> <b>` with `+ - * /`. No precedence and no
/// nesting; a leading `-` is part of the operand.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens: Vec<&str> = expression.split_whitespace().collect();
    let &[lhs, op, rhs] = tokens.as_slice() else {
        return Err(CalcError::Format);
    };

    let a: f64 = lhs.parse().map_err(|_| CalcError::Format)?;
    let b: f64 = rhs.parse().map_err(|_| CalcError::Format)?;

    match op {
        "+" => Ok(a + b),
        "-" => Ok(a - b),
        "*" => Ok(a * b),
        "/" if b == 0.0 => Err(CalcError::DivisionByZero),
        "/" => Ok(a / b),
        other => Err(CalcError::UnsupportedOperator(other.to_string())),
    }
}
