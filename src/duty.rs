// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Landed cost of imported goods from their HS code rates.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Tariff rates of an HS code, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DutyRates {
    pub duty: Decimal,
    pub vat: Decimal,
    pub excise: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LandedCost {
    pub cif: Decimal,
    pub duty: Decimal,
    pub vat: Decimal,
    pub excise: Decimal,
    pub total: Decimal,
}

pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn pct(rate: Decimal) -> Decimal {
    rate / Decimal::ONE_HUNDRED
}

pub fn cif_from_components(fob: Decimal, insurance: Decimal, freight: Decimal) -> Decimal {
    round_money(fob + insurance + freight)
}

impl LandedCost {
    /// VAT is levied on the duty-inclusive base; excise on CIF alone.
    pub fn compute(cif: Decimal, rates: &DutyRates) -> Self {
        let cif = round_money(cif);
        let duty = round_money(cif * pct(rates.duty));
        let vat = round_money((cif + duty) * pct(rates.vat));
        let excise = round_money(cif * pct(rates.excise));
        LandedCost {
            cif,
            duty,
            vat,
            excise,
            total: cif + duty + vat + excise,
        }
    }

    pub fn taxes(&self) -> Decimal {
        self.duty + self.vat + self.excise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn vat_applies_to_duty_inclusive_base() {
        let rates = DutyRates {
            duty: d("10"),
            vat: d("11"),
            excise: d("5"),
        };
        let lc = LandedCost::compute(d("1000"), &rates);
        assert_eq!(lc.duty, d("100.00"));
        assert_eq!(lc.vat, d("121.00"));
        assert_eq!(lc.excise, d("50.00"));
        assert_eq!(lc.total, d("1271.00"));
        assert_eq!(lc.taxes(), d("271.00"));
    }

    #[test]
    fn zero_rates_leave_cif_untouched() {
        let rates = DutyRates {
            duty: Decimal::ZERO,
            vat: Decimal::ZERO,
            excise: Decimal::ZERO,
        };
        let lc = LandedCost::compute(d("2500.50"), &rates);
        assert_eq!(lc.total, d("2500.50"));
        assert!(lc.taxes().is_zero());
    }

    #[test]
    fn components_round_half_away_from_zero() {
        let rates = DutyRates {
            duty: d("7.5"),
            vat: d("11"),
            excise: Decimal::ZERO,
        };
        // duty 123.45 * 7.5% = 9.25875 -> 9.26; vat (132.71) * 11% = 14.5981 -> 14.60
        let lc = LandedCost::compute(d("123.45"), &rates);
        assert_eq!(lc.duty, d("9.26"));
        assert_eq!(lc.vat, d("14.60"));
        assert_eq!(lc.total, d("147.31"));
    }

    #[test]
    fn cif_sums_fob_insurance_freight() {
        assert_eq!(cif_from_components(d("900"), d("12.5"), d("87.5")), d("1000.00"));
    }
}
