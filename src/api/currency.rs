use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;

use super::error::ComputerenderError;

/// An exact amount of US dollars, as reported by the `cost` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money(BigDecimal);

impl Money {
    pub fn amount(&self) -> &BigDecimal {
        &self.0
    }

    pub fn into_amount(self) -> BigDecimal {
        self.0
    }
}

impl FromStr for Money {
    type Err = ComputerenderError;

    /// Parses `"$<decimal>"`. Any other currency marker is rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let currency_error = |reason: String| ComputerenderError::Currency {
            value: value.to_string(),
            reason,
        };

        let Some(amount) = value.strip_prefix('$') else {
            return Err(currency_error("expected US dollars".to_string()));
        };

        BigDecimal::from_str(amount)
            .map(Money)
            .map_err(|e| currency_error(e.to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dollar_amount_exactly() {
        let money: Money = "$1.23".parse().unwrap();
        assert_eq!(money.amount(), &BigDecimal::from_str("1.23").unwrap());
        assert_eq!(money.to_string(), "$1.23");
    }

    #[test]
    fn keeps_precision_beyond_f64() {
        let money: Money = "$0.10000000000000000001".parse().unwrap();
        assert_eq!(money.to_string(), "$0.10000000000000000001");
    }

    #[test]
    fn rejects_other_currencies() {
        let err = "€1.23".parse::<Money>().unwrap_err();
        assert!(matches!(err, ComputerenderError::Currency { ref value, .. } if value == "€1.23"));
    }

    #[test]
    fn rejects_empty_and_bare_marker() {
        assert!(matches!(
            "".parse::<Money>(),
            Err(ComputerenderError::Currency { .. })
        ));
        assert!(matches!(
            "$".parse::<Money>(),
            Err(ComputerenderError::Currency { .. })
        ));
    }

    #[test]
    fn rejects_non_decimal_amount() {
        assert!(matches!(
            "$one".parse::<Money>(),
            Err(ComputerenderError::Currency { .. })
        ));
    }
}
