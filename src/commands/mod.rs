// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod customers;
pub mod vendors;
pub mod hs_codes;
pub mod orders;
pub mod purchases;
pub mod costs;
pub mod invoices;
pub mod reports;
pub mod importer;
pub mod exporter;
pub mod config;
pub mod doctor;
