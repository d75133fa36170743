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
use crate::embed::{self, DisplayRow, EmbedOverrides};
use crate::identity;
use crate::ranking;
use crate::utils::get_guild_id;
use crate::{Context, Error};
use poise::CreateReply;

#[poise::command(
    slash_command,
    guild_only,
    description_localized("en-US", "Show the ranking leaderboard as an embed."),
    description_localized("es-ES", "Muestra la tabla de ranking.")
)]
#[podio::log_cmd]
pub async fn ranking(
    ctx: Context<'_>,
    #[description = "Page to show (1-based)."]
    #[min = 1]
    page: Option<u32>,
    #[description = "Show every ranked user on a single page."] show_all: Option<bool>,
    #[description = "Custom embed title."]
    #[max_length = 256]
    title: Option<String>,
    #[description = "Custom embed description."]
    #[max_length = 2000]
    description: Option<String>,
    #[description = "URL of a large image for the embed."] image: Option<String>,
    #[description = "URL of a custom thumbnail."] thumbnail: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let guild_id = get_guild_id!(ctx);
    let data = ctx.data();

    let entries = ranking::get_sorted(&data.store, None).await;
    let page = page.unwrap_or(1) as usize;
    let per_page = if show_all.unwrap_or(false) {
        entries.len().max(1)
    } else {
        data.config.per_page
    };
    let (start, slice) = ranking::page_slice(&entries, page, per_page);
    if slice.is_empty() {
        ctx.say("No data for this page.").await?;
        return Ok(());
    }

    let rows: Vec<DisplayRow> = slice
        .iter()
        .enumerate()
        .map(|(i, entry)| DisplayRow {
            rank: start + i + 1,
            mention: format!("<@{}>", entry.user_id),
            points: entry.points,
        })
        .collect();

    // Default thumbnail: the global rank-1 avatar, whatever page is shown.
    let default_thumbnail = if thumbnail.is_none() {
        identity::resolve_identity(&ctx, guild_id, &entries[0].user_id)
            .await
            .avatar_url
    } else {
        None
    };

    let overrides = EmbedOverrides {
        title,
        description,
        image,
        thumbnail,
    };
    let embed = embed::leaderboard_embed(
        &rows,
        entries.len(),
        page,
        per_page,
        &overrides,
        default_thumbnail,
        &data.config.embed_title,
    );
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
