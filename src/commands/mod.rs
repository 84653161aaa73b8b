// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod dividends;
pub mod doctor;
pub mod exporter;
pub mod holdings;
pub mod importer;
pub mod portfolio;
pub mod prices;
pub mod transactions;
