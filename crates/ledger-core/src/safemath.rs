// ledger-core/src/safemath.rs

//! Checked u64 arithmetic.
//!
//! Every counter update in the ledger goes through these four functions so
//! that integer wraparound surfaces as an error instead of corrupting supply
//! accounting.

/// Result type for checked arithmetic
pub type MathResult = Result<u64, MathError>;

/// Arithmetic failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("arithmetic underflow")]
    Underflow,

    #[error("division by zero")]
    DivideByZero,
}

/// Checked addition
pub fn add(a: u64, b: u64) -> MathResult {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// Checked subtraction
pub fn sub(a: u64, b: u64) -> MathResult {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

/// Checked multiplication; zero operands short-circuit to zero
pub fn mul(a: u64, b: u64) -> MathResult {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    a.checked_mul(b).ok_or(MathError::Overflow)
}

/// Checked division
pub fn div(a: u64, b: u64) -> MathResult {
    a.checked_div(b).ok_or(MathError::DivideByZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        assert_eq!(add(2, 3), Ok(5));
        assert_eq!(add(u64::MAX, 0), Ok(u64::MAX));
        assert_eq!(add(u64::MAX, 1), Err(MathError::Overflow));
    }

    #[test]
    fn test_sub() {
        assert_eq!(sub(5, 3), Ok(2));
        assert_eq!(sub(3, 3), Ok(0));
        assert_eq!(sub(2, 3), Err(MathError::Underflow));
    }

    #[test]
    fn test_mul() {
        assert_eq!(mul(6, 7), Ok(42));
        assert_eq!(mul(0, u64::MAX), Ok(0));
        assert_eq!(mul(u64::MAX, 0), Ok(0));
        assert_eq!(mul(u64::MAX, 2), Err(MathError::Overflow));
        assert_eq!(mul(u64::MAX, 1), Ok(u64::MAX));
    }

    #[test]
    fn test_div() {
        assert_eq!(div(42, 7), Ok(6));
        assert_eq!(div(7, 2), Ok(3)); // floor division
        assert_eq!(div(1, 0), Err(MathError::DivideByZero));
    }
}
