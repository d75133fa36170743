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
use poise::serenity_prelude::CreateAttachment;
use poise::CreateReply;

#[poise::command(
    slash_command,
    rename = "rank-export",
    guild_only,
    description_localized("en-US", "Download the ranking database as a JSON file."),
    description_localized("es-ES", "Descarga la base de datos del ranking como fichero JSON.")
)]
#[podio::log_cmd]
pub async fn rank_export(ctx: Context<'_>) -> Result<(), Error> {
    require_authorized!(ctx);
    let json = ctx.data().store.export_json().await;
    ctx.send(
        CreateReply::default()
            .content("Current ranking database:")
            .attachment(CreateAttachment::bytes(json.into_bytes(), "ranking.json")),
    )
    .await?;

    Ok(())
}
