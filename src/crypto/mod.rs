// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encryption of card numbers at rest.

pub mod card_codec;

pub use card_codec::{mask_card_number, CardCodec, CodecError};
