pub mod admin;
pub mod network;
pub mod nodes;
pub mod orders;

use rust_decimal::Decimal;
use validator::ValidationError;

// Validadores compartilhados para campos Decimal (o derive `range` do
// validator não cobre Decimal).

pub(crate) fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("deve ser maior que zero".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_percent_rate(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("percent_range");
        err.message = Some("deve estar entre 0 e 100".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn valor_zero_ou_negativo_e_invalido() {
        assert!(validate_positive_amount(&dec!(0)).is_err());
        assert!(validate_positive_amount(&dec!(-5)).is_err());
        assert!(validate_positive_amount(&dec!(0.01)).is_ok());
    }

    #[test]
    fn taxa_fora_de_0_a_100_e_invalida() {
        assert!(validate_percent_rate(&dec!(-0.1)).is_err());
        assert!(validate_percent_rate(&dec!(100.1)).is_err());
        assert!(validate_percent_rate(&dec!(0)).is_ok());
        assert!(validate_percent_rate(&dec!(100)).is_ok());
    }
}
