/*
 *  Podio - Discord bot maintaining a point-based ranking for a guild.
 *  Copyright (C) 2025  Podio contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::store::ResetMode;
use crate::utils::require_authorized;
use crate::{Context, Error};

#[poise::command(
    slash_command,
    rename = "rank-reset",
    guild_only,
    description_localized("en-US", "Reset the ranking: zero every score or wipe every user."),
    description_localized("es-ES", "Reinicia el ranking: puntuaciones a cero o borrado total.")
)]
#[podio::log_cmd]
pub async fn rank_reset(
    ctx: Context<'_>,
    #[description = "zero keeps users at 0 pts; wipe deletes everyone."] mode: ResetMode,
) -> Result<(), Error> {
    require_authorized!(ctx);
    ctx.data().store.reset_all(mode).await?;
    match mode {
        ResetMode::Zero => {
            ctx.reply("Every score has been reset to **0** pts.").await?;
        }
        ResetMode::Wipe => {
            ctx.reply("The ranking has been wiped. No users remain.")
                .await?;
        }
    }

    Ok(())
}
