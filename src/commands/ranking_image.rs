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
use crate::canvas::{self, CanvasEntry};
use crate::identity;
use crate::ranking::{self, SortedEntry};
use crate::utils::get_guild_id;
use crate::{Context, Error};
use poise::serenity_prelude::{CreateAttachment, GuildId};
use poise::CreateReply;

/// Resolves one sorted entry into a drawable row, avatar included when the
/// member lookup and the CDN cooperate.
async fn resolve_entry(
    ctx: &Context<'_>,
    guild_id: GuildId,
    rank: usize,
    entry: &SortedEntry,
) -> CanvasEntry {
    let identity = identity::resolve_identity(ctx, guild_id, &entry.user_id).await;
    let avatar_png = match &identity.avatar_url {
        Some(url) => identity::fetch_avatar(&ctx.data().http, url).await,
        None => None,
    };
    CanvasEntry {
        rank,
        name: identity.display_name,
        points: entry.points,
        avatar_png,
    }
}

#[poise::command(
    slash_command,
    rename = "ranking-image",
    guild_only,
    description_localized("en-US", "Render the current ranking as a leaderboard image."),
    description_localized("es-ES", "Genera una imagen estilo leaderboard del ranking actual.")
)]
#[podio::log_cmd]
pub async fn ranking_image(
    ctx: Context<'_>,
    #[description = "Page to show (1-based)."]
    #[min = 1]
    page: Option<u32>,
    #[description = "Include every ranked user on a single page."] show_all: Option<bool>,
) -> Result<(), Error> {
    // Avatar fetches plus rasterization can exceed the 3-second reply window.
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

    let mut top3 = Vec::with_capacity(3);
    for (i, entry) in entries.iter().take(3).enumerate() {
        top3.push(resolve_entry(&ctx, guild_id, i + 1, entry).await);
    }
    let mut rows = Vec::with_capacity(slice.len());
    for (i, entry) in slice.iter().enumerate() {
        rows.push(resolve_entry(&ctx, guild_id, start + i + 1, entry).await);
    }

    let png =
        tokio::task::spawn_blocking(move || canvas::render_leaderboard(&top3, &rows)).await??;

    ctx.send(
        CreateReply::default().attachment(CreateAttachment::bytes(png, "leaderboard.png")),
    )
    .await?;

    Ok(())
}
