use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

/// Pricing and consultation modes a consultant offers at booking time.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantTerms {
    pub consultant_id: String,
    pub hourly_rate: Decimal,
    pub consultation_modes: Vec<String>,
    pub updated_at: OffsetDateTime,
}

/// Largest value a NUMERIC(12, 2) money column holds.
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

impl ConsultantTerms {
    pub fn offers_mode(&self, mode: &str) -> bool {
        self.consultation_modes.iter().any(|offered| offered == mode)
    }

    /// Charge for a booking of `duration_minutes`, fixed at booking time.
    /// `None` when the charge cannot be stored.
    pub fn amount_for(&self, duration_minutes: i32) -> Option<Decimal> {
        let amount = self
            .hourly_rate
            .checked_mul(Decimal::from(duration_minutes))?
            .checked_div(Decimal::from(60))?
            .round_dp(2);
        (amount <= max_money()).then_some(amount)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConsultantTerms {
    pub hourly_rate: Decimal,
    #[validate(length(min = 1, message = "At least one consultation mode is required"))]
    pub consultation_modes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(rate: Decimal) -> ConsultantTerms {
        ConsultantTerms {
            consultant_id: "consultant-1".to_string(),
            hourly_rate: rate,
            consultation_modes: vec!["video".to_string(), "phone".to_string()],
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn amount_is_prorated_from_hourly_rate() {
        let terms = terms(Decimal::new(12000, 2));
        assert_eq!(terms.amount_for(60), Some(Decimal::new(12000, 2)));
        assert_eq!(terms.amount_for(30), Some(Decimal::new(6000, 2)));
        assert_eq!(terms.amount_for(45), Some(Decimal::new(9000, 2)));
    }

    #[test]
    fn amount_rounds_to_cents() {
        let terms = terms(Decimal::new(10000, 2));
        assert_eq!(terms.amount_for(20), Some(Decimal::new(3333, 2)));
    }

    #[test]
    fn unstorable_amounts_are_refused() {
        assert_eq!(terms(Decimal::MAX).amount_for(60), None);
        assert_eq!(terms(max_money()).amount_for(120), None);
        assert_eq!(terms(max_money()).amount_for(60), Some(max_money()));
    }

    #[test]
    fn mode_membership() {
        let terms = terms(Decimal::ONE);
        assert!(terms.offers_mode("video"));
        assert!(!terms.offers_mode("in_person"));
    }
}
