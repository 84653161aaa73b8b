// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure ledger core: every function here takes plain state and returns new
//! state or a derived value. No I/O, no sqlite, no hidden time-dependence.

pub mod balance;
pub mod dividends;
pub mod positions;
pub mod snapshot;
pub mod worth;
