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
use crate::utils::require_authorized;
use crate::{Context, Error};
use poise::serenity_prelude::{Mentionable, User};

#[poise::command(
    slash_command,
    rename = "rank-add-user",
    guild_only,
    description_localized("en-US", "Add a user to the ranking with 0 points."),
    description_localized("es-ES", "Añade un usuario al ranking con 0 puntos.")
)]
#[podio::log_cmd]
pub async fn rank_add_user(
    ctx: Context<'_>,
    #[description = "User to add to the ranking."] user: User,
) -> Result<(), Error> {
    require_authorized!(ctx);
    let created = ctx.data().store.add_user(&user.id.to_string()).await?;
    if created {
        ctx.reply(format!(
            "{} joined the ranking with **0** pts.",
            user.mention()
        ))
        .await?;
    } else {
        ctx.reply(format!("{} is already on the ranking.", user.mention()))
            .await?;
    }

    Ok(())
}

#[poise::command(
    slash_command,
    rename = "rank-remove-user",
    guild_only,
    description_localized("en-US", "Remove a user from the ranking."),
    description_localized("es-ES", "Elimina un usuario del ranking.")
)]
#[podio::log_cmd]
pub async fn rank_remove_user(
    ctx: Context<'_>,
    #[description = "User to remove from the ranking."] user: User,
) -> Result<(), Error> {
    require_authorized!(ctx);
    let removed = ctx.data().store.remove_user(&user.id.to_string()).await?;
    if removed {
        ctx.reply(format!("{} was removed from the ranking.", user.mention()))
            .await?;
    } else {
        ctx.reply(format!("{} was not on the ranking.", user.mention()))
            .await?;
    }

    Ok(())
}
