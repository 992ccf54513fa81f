// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use clap::Args;

/// Arguments for the status command.
#[derive(Debug, Clone, Default, Args)]
pub struct StatusArgs {
    /// Exit with status 1 if the build graph needs regeneration.
    #[arg(long = "exit-code")]
    pub exit_code: bool,
}
