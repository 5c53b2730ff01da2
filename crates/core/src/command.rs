// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome_domain::{NotifyMode, RotaAction};

/// A request to move a rota through its approval lifecycle.
///
/// Commands are data only; `apply_rota_command` decides their effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotaCommand {
    /// Send the rota to managers for approval.
    Submit,
    /// Publish the rota and tell the people on it.
    Publish {
        /// Who to tell.
        notify: NotifyMode,
    },
    /// Return the rota to its creator.
    Reject {
        /// Reason shown to the creator. A default is used when absent.
        message: Option<String>,
    },
    /// Take the rota over for manager edits before publishing.
    BeginManagerEdit,
}

impl RotaCommand {
    /// The lifecycle action this command performs.
    #[must_use]
    pub const fn action(&self) -> RotaAction {
        match self {
            Self::Submit => RotaAction::Submit,
            Self::Publish { .. } => RotaAction::Publish,
            Self::Reject { .. } => RotaAction::Reject,
            Self::BeginManagerEdit => RotaAction::BeginManagerEdit,
        }
    }
}
