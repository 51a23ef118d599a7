// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Concrete records, one per managed table.

mod blackout;
mod project;
mod reservation;
mod room;
mod roster;
mod user;

pub use blackout::{BlackoutDefinition, RoomBlackout, BLACKOUT_DESCRIPTION_MAX, BLACKOUT_NAME_MAX};
pub use project::{Project, PROJECT_NAME_MAX, PROJECT_NICKNAME_MAX};
pub use reservation::Reservation;
pub use room::{Room, ROOM_NAME_MAX, ROOM_SHORT_NAME_MAX};
pub use roster::ProjectRoster;
pub use user::{User, USER_EMAIL_MAX, USER_NAME_MAX};
