// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub npwp: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub service_type: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub npwp: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsCode {
    pub code: String,
    pub description: String,
    pub duty_rate: Decimal,
    pub vat_rate: Decimal,
    pub excise_rate: Decimal,
}

impl HsCode {
    pub fn rates(&self) -> crate::duty::DutyRates {
        crate::duty::DutyRates {
            duty: self.duty_rate,
            vat: self.vat_rate,
            excise: self.excise_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOrder {
    pub id: String,
    pub customer_id: String,
    pub order_date: NaiveDate,
    pub mode: ShipmentMode,
    pub origin: String,
    pub destination: String,
    pub cargo: String,
    pub weight_kg: Decimal,
    pub volume_cbm: Decimal,
    pub hs_code: Option<String>,
    pub cif_value: Option<Decimal>,
    pub currency: String,
    pub estimated_cost: Decimal,
    pub selling_price: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: String,
    pub vendor_id: String,
    pub sales_order_id: Option<String>,
    pub order_date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: PurchaseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationalCost {
    pub id: String,
    pub sales_order_id: String,
    pub vendor_id: Option<String>,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellingCost {
    pub id: String,
    pub sales_order_id: String,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub number: String,
    pub customer_id: String,
    pub sales_order_id: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub taxable: bool,
}

impl InvoiceItem {
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        taxable: bool,
    ) -> Self {
        InvoiceItem {
            description: description.into(),
            quantity,
            unit_price,
            amount: crate::duty::round_money(quantity * unit_price),
            taxable,
        }
    }
}

macro_rules! string_enum {
    ($name:ident, $entity:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok($name::$variant),)+
                    other => Err(AppError::validation(
                        $entity,
                        format!(
                            "unknown value '{}', expected one of: {}",
                            other,
                            [$($s),+].join(", ")
                        ),
                    )),
                }
            }
        }
    };
}

string_enum!(ShipmentMode, "mode", {
    Sea => "sea",
    Air => "air",
    Land => "land",
});

string_enum!(OrderStatus, "status", {
    Draft => "draft",
    Confirmed => "confirmed",
    InTransit => "in_transit",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

string_enum!(PurchaseStatus, "status", {
    Draft => "draft",
    Issued => "issued",
    Received => "received",
    Paid => "paid",
    Cancelled => "cancelled",
});

string_enum!(InvoiceStatus, "status", {
    Unpaid => "unpaid",
    Paid => "paid",
    Overdue => "overdue",
    Cancelled => "cancelled",
});

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Draft, Confirmed)
                | (Confirmed, InTransit)
                | (InTransit, Delivered)
                | (Draft, Cancelled)
                | (Confirmed, Cancelled)
        )
    }
}

impl PurchaseStatus {
    pub fn can_transition_to(self, next: PurchaseStatus) -> bool {
        use PurchaseStatus::*;
        matches!(
            (self, next),
            (Draft, Issued)
                | (Issued, Received)
                | (Received, Paid)
                | (Draft, Cancelled)
                | (Issued, Cancelled)
        )
    }
}

impl InvoiceStatus {
    /// Stored status with `overdue` derived for unpaid invoices past due.
    pub fn effective(self, due_date: NaiveDate, today: NaiveDate) -> InvoiceStatus {
        match self {
            InvoiceStatus::Unpaid if due_date < today => InvoiceStatus::Overdue,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_machine() {
        use OrderStatus::*;
        assert!(Draft.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!InTransit.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Delivered));
        for s in OrderStatus::ALL {
            assert!(!Cancelled.can_transition_to(*s));
        }
    }

    #[test]
    fn purchase_status_machine() {
        use PurchaseStatus::*;
        assert!(Draft.can_transition_to(Issued));
        assert!(Received.can_transition_to(Paid));
        assert!(!Received.can_transition_to(Cancelled));
        assert!(!Paid.can_transition_to(Draft));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(" In_Transit ".parse::<OrderStatus>().unwrap(), OrderStatus::InTransit);
        assert_eq!("AIR".parse::<ShipmentMode>().unwrap(), ShipmentMode::Air);
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert!(err.to_string().contains("expected one of: draft, confirmed"));
    }

    #[test]
    fn overdue_is_derived_from_due_date() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let before = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(InvoiceStatus::Unpaid.effective(due, before), InvoiceStatus::Unpaid);
        assert_eq!(InvoiceStatus::Unpaid.effective(due, after), InvoiceStatus::Overdue);
        assert_eq!(InvoiceStatus::Paid.effective(due, after), InvoiceStatus::Paid);
    }

    #[test]
    fn item_amount_is_quantity_times_price() {
        let item = InvoiceItem::new(
            "THC",
            Decimal::from(3),
            Decimal::from_str_exact("1250.555").unwrap(),
            true,
        );
        assert_eq!(item.amount, Decimal::from_str_exact("3751.67").unwrap());
    }
}
